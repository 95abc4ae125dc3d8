pub mod config_selector;
