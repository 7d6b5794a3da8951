pub mod upstream_selector;

pub use upstream_selector::RandomUpstreamSelector;
