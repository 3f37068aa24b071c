//! SPOTDECK Core - Resource Types and Pure Logic
//!
//! Records decoded from the provider, price ranking, selection, action
//! encoding and render fragments. Nothing in this crate performs I/O
//! beyond reading the configuration file.

pub mod action;
pub mod category;
pub mod config;
pub mod error;
pub mod fragment;
pub mod pricing;
pub mod resources;
pub mod results;
pub mod selection;

pub use action::ActionRequest;
pub use category::Category;
pub use config::{CachePolicy, CacheTable, PanelConfig, Selectors};
pub use error::{
    ActionParseError, ConfigError, DecodeError, GatewayError, SelectionError, SpotdeckError,
    SpotdeckResult,
};
pub use fragment::{ActionLink, Fragment, Notice, NoticeLevel, RenderedView, Row, Table};
pub use pricing::{format_price, rank_matching, rank_prices, suggest_bid, TypeQuote, ZoneQuote};
pub use resources::{
    latest_image, Image, Instance, KeyPair, PriceSample, SecurityGroup, SpotRequest, Timestamp,
};
pub use results::{CancelledBid, CreatedImage, InstanceStateChange, SubmittedBid};
pub use selection::{select_key_pair, select_security_group};
