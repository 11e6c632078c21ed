//! Wavefront OBJ export.

use std::io::{self, Write};

use cms_mesh_cpu::MeshBuild;
use hashbrown::HashMap;

/// Writes `mesh` as `v`/`vn`/`f` records. Triangles are wound
/// counter-clockwise seen from outside. With `weld`, coincident positions
/// share one `v` record; normals stay per corner.
pub fn write_obj<W: Write>(mesh: &MeshBuild, weld: bool, out: &mut W) -> io::Result<()> {
    writeln!(out, "# cms: {} triangles", mesh.triangle_count())?;

    let mut position_of = Vec::with_capacity(mesh.vertices.len());
    let mut seen: HashMap<[u32; 3], usize> = HashMap::new();
    for v in &mesh.vertices {
        let p = v.position;
        // + 0.0 folds -0.0 into 0.0
        let key = [(p.x + 0.0).to_bits(), (p.y + 0.0).to_bits(), (p.z + 0.0).to_bits()];
        let next = if weld { seen.len() + 1 } else { position_of.len() + 1 };
        let slot = if weld { *seen.entry(key).or_insert(next) } else { next };
        if slot == next {
            writeln!(out, "v {} {} {}", p.x, p.y, p.z)?;
        }
        position_of.push(slot);
    }
    for v in &mesh.vertices {
        let n = v.normal;
        writeln!(out, "vn {} {} {}", n.x, n.y, n.z)?;
    }
    for tri in mesh.indices.chunks_exact(3) {
        let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        writeln!(
            out,
            "f {}//{} {}//{} {}//{}",
            position_of[a],
            a + 1,
            position_of[c],
            c + 1,
            position_of[b],
            b + 1
        )?;
    }
    Ok(())
}
