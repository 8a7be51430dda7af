//! # Hamlet
//!
//! Procedural village generation coupled with LLM-driven villager decision
//! making.
//!
//! ## Architecture Overview
//!
//! Hamlet is split into three cooperating subsystems:
//!
//! - **Map Generation**: a deterministic tile-grid world generator that
//!   places buildings, perimeter walls, decorations, and a narrative clue,
//!   then routes and paints a walkway network connecting every building
//!   entrance (greedy tour construction + 2-opt refinement + BFS over the
//!   tile graph).
//! - **Decision Engine**: a per-villager state machine that executes one
//!   decision at a time through a start/advance/finish lifecycle, with a
//!   pluggable strategy for choosing the next decision.
//! - **LLM Integration**: an asynchronous strategy that snapshots the
//!   villager's world state, sends it to an external inference server, and
//!   maps the numeric reply back onto a concrete decision without ever
//!   blocking the simulation tick.
//!
//! Rendering, physics, and UI are external collaborators; the crate models
//! the terrain only as the height/splat-map surface the generator paints on.

pub mod llm;
pub mod map;
pub mod npc;
pub mod sim;

pub use llm::{
    ChatMessage, ChatRequest, ChatResponse, HttpLlmService, LlmService, LoadModelRequest,
    ServerStatus, ServiceReply,
};
pub use map::{
    Catalog, CatalogEntry, GenerationConfig, GridPos, MapGenerator, PathRouter, PlacedStructure,
    StructureId, StructureKind, StructurePrototype, Terrain, Tile, TileGrid, TileId, VillageMap,
    WorldPos,
};
pub use npc::{Decision, DecisionStrategy, LlmStrategy, Memory, NavAgent, Npc, RandomStrategy};
pub use sim::{SimContext, Simulation};

/// Core error type for the Hamlet engine.
#[derive(thiserror::Error, Debug)]
pub enum HamletError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Simulation or generator state is invalid
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Map generation failed
    #[error("Generation failed: {0}")]
    GenerationFailed(String),

    /// LLM service error
    #[error("LLM error: {0}")]
    LlmError(String),
}

/// Result type used throughout the Hamlet codebase.
pub type HamletResult<T> = Result<T, HamletError>;

/// Version information for the crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine configuration constants.
pub mod config {
    /// Default map width in tiles
    pub const DEFAULT_MAP_WIDTH: usize = 40;

    /// Default map length in tiles
    pub const DEFAULT_MAP_LENGTH: usize = 40;

    /// Default tile edge length in world units
    pub const DEFAULT_TILE_SIZE: f32 = 10.0;

    /// Splat-map resolution (pixels per side)
    pub const ALPHAMAP_RESOLUTION: usize = 512;

    /// Number of splat-map texture layers
    pub const ALPHAMAP_LAYERS: usize = 4;

    /// Splat layer painted under walkways
    pub const PATH_LAYER: usize = 1;

    /// Minimum number of buildings guaranteed regardless of density tuning
    pub const MINIMUM_BUILDINGS: usize = 6;

    /// Relevance score assumed when the LLM reply cannot be parsed
    pub const DEFAULT_RELEVANCE: i32 = 5;
}
