pub mod feed_stream;
pub mod render_surface;
