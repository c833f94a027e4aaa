mod common;
mod narrative;
mod routing;
