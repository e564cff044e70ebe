// Concrete rendering collaborators
pub mod svg;

pub use svg::SvgSurface;
