//! Groups a cell's segments into closed loops by following shared edges.

use crate::constants::{MAX_CELL_COMPONENTS, MAX_CELL_SEGMENTS};
use crate::segment::{EdgeVertex, SegmentList};

/// One closed loop of segments plus its representative vertex.
#[derive(Clone, Copy, Debug, Default)]
pub struct Component {
    segments: [u8; MAX_CELL_SEGMENTS],
    len: u8,
    pub vertex: EdgeVertex,
    pub sharp: bool,
}

impl Component {
    #[inline]
    fn push(&mut self, segment: usize) {
        self.segments[self.len as usize] = segment as u8;
        self.len += 1;
    }

    /// Segment indices in loop order.
    #[inline]
    pub fn segments(&self) -> &[u8] {
        &self.segments[..self.len as usize]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len as usize
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct ComponentList {
    items: [Component; MAX_CELL_COMPONENTS],
    len: usize,
}

impl ComponentList {
    #[inline]
    fn push(&mut self, c: Component) {
        assert!(
            self.len < MAX_CELL_COMPONENTS,
            "more than {} loops in one cell",
            MAX_CELL_COMPONENTS
        );
        self.items[self.len] = c;
        self.len += 1;
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn as_slice(&self) -> &[Component] {
        &self.items[..self.len]
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [Component] {
        &mut self.items[..self.len]
    }
}

/// Partitions `segments` into closed loops. Segments matched on their `b` end
/// are flipped in place so every loop runs `a -> b` head to tail.
///
/// Panics when a loop cannot be closed: that only happens with a broken
/// segment table, never with volume data.
pub fn trace_components(segments: &mut SegmentList) -> ComponentList {
    let segs = segments.as_mut_slice();
    let n = segs.len();
    let all: u16 = if n == 0 { 0 } else { (1u16 << n) - 1 };
    let mut assigned: u16 = 0;
    let mut out = ComponentList::default();

    while assigned != all {
        let first = (!assigned & all).trailing_zeros() as usize;
        assigned |= 1 << first;
        let mut comp = Component::default();
        comp.push(first);

        let start = segs[first].a.edge;
        let mut end = segs[first].b.edge;
        let mut cursor = first;
        while end != start {
            let next = (1..n)
                .map(|step| (cursor + step) % n)
                .find(|&j| assigned & (1 << j) == 0 && (segs[j].a.edge == end || segs[j].b.edge == end));
            let Some(j) = next else {
                panic!(
                    "segment loop starting on edge {} is open at edge {} ({} segments)",
                    start, end, n
                );
            };
            if segs[j].a.edge != end {
                segs[j] = segs[j].flipped();
            }
            assigned |= 1 << j;
            comp.push(j);
            end = segs[j].b.edge;
            cursor = j;
        }
        out.push(comp);
    }
    out
}
