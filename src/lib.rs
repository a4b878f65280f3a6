pub mod config;
pub mod db;
pub mod error;
pub mod models;

// Reference store and the derivation layer on top of it / 참조 저장소와 파생 계층
pub mod store;
pub mod phonetic;
pub mod meaning;
pub mod search;
pub mod character;
pub mod radicals;
pub mod glyph;

// Learning features / 학습 기능
pub mod srs;
pub mod device;
pub mod mission;
pub mod notify;
pub mod view;

pub mod api;
pub mod state;
