pub mod archive;
pub mod routing_pipeline;
pub mod screening_pipeline;

pub use routing_pipeline::RoutingPipeline;
pub use screening_pipeline::ScreeningPipeline;
