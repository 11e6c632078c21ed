//! Cubical Marching Squares isosurface extraction with sharp-feature reconstruction.
//!
//! Each cell marches its six faces into line segments, chains those into closed
//! loops, places one vertex per loop (relaxing it onto sharp creases when the
//! boundary normals disagree) and fans triangles around it. Cells are
//! independent; `extract` schedules them sequentially or on rayon.
#![forbid(unsafe_code)]

mod build;
mod cell;
mod config;
mod constants;
mod emit;
mod error;
mod face;
mod mesh_build;
mod segment;
mod sharp;
mod tables;
mod trace;

pub use build::{Executor, ExtractOutput, MeshStats, extract};
pub use cell::{CellCoord, CellCorners, CellReport, mesh_cell};
pub use config::CmsConfig;
pub use constants::*;
pub use emit::{CellFrame, ShadingMode, emit_component, face_normal};
pub use error::CmsError;
pub use face::{Face, FaceMask};
pub use mesh_build::{MeshBuild, MeshCapacity, MeshSink, OutputVertex};
pub use segment::{
    EdgeVertex, Segment, SegmentEnd, SegmentList, edge_vertex, face_config, face_sharp_vertex,
    generate_face_segments,
};
pub use sharp::{BoundaryRule, SolvedVertex, SolverParams, solve_component};
pub use tables::{CORNER_OFFSETS, CORNER_POSITIONS, EDGES, FACE_CORNERS, FACE_EDGES, SEGMENT_TABLE};
pub use trace::{Component, ComponentList, trace_components};
