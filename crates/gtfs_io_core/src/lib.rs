//! Schema-driven reading and writing of GTFS feeds.
//!
//! A [`Reader`] turns table [`SourceFile`]s into a [`Feed`], loading each
//! table after the tables it references. A [`Writer`] performs the inverse,
//! emitting every non-empty table in a stable order.

pub mod codec;
pub mod collection;
pub mod config;
pub mod feed;
pub mod layout;
pub mod progress;
pub mod reader;
pub mod schema;
pub mod source;
pub mod target;
pub mod writer;

pub use codec::CodecError;
pub use collection::{EntityCollection, ListCollection, UniqueCollection, UniqueEntityCollection};
pub use config::{InvalidValuePolicy, ParserConfig, ReaderConfig};
pub use feed::Feed;
pub use layout::FeedLayout;
pub use progress::{NoOpProgressHandler, ProgressHandler};
pub use reader::{ReadError, Reader};
pub use schema::{EntitySchema, FieldCodec, Schemas};
pub use source::{
    directory_sources, open_sources, zip_sources, FileSource, LinePreprocessor, MemorySource,
    SourceError, SourceFile, ZipSource,
};
pub use target::{DirectoryTargets, MemoryTargets, TargetError, TargetFile, TargetProvider};
pub use writer::{WriteError, Writer};

pub use gtfs_io_model as model;
