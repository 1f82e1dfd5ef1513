mod client;

pub use client::{
    DEFAULT_BASE_URL, DocumentClient, DocumentError, FetchedDocument, ItemKind, RemoteItem,
};
