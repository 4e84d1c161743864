pub mod archive;
pub mod client;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod fragment;
pub mod protocol;
pub mod server;
pub mod settings;
pub mod state;

pub use archive::{Post, PostArchive};
pub use client::{Fragment, FragmentFetcher, FragmentRequest, HttpFragmentClient, RequestId};
pub use config::{AppConfig, EasingType, StickyEdge};
pub use error::{Error, Result};
pub use fragment::AddressFragment;
pub use server::ArchiveServer;
pub use settings::SettingsStore;
pub use state::{ArchiveQuery, PagePosition, PaginationState};
