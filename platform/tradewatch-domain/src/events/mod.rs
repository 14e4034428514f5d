pub mod feed_event;
