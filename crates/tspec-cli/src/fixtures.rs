//! # Guitar Fixtures
//!
//! Sample schemas and records used by the `validate`, `bench`, and
//! `summary` subcommands: a `Pickup` type, a `Guitar` type holding a
//! non-empty array of pickups, and a `GuitarSummary` derived from a guitar
//! by [`Fixtures::summary_op`].

use std::sync::Arc;

use serde_json::{json, Value};
use tspec_core::{CompiledSpec, Predicate, TypeSpec, TypeSpecError};
use tspec_pipeline::{Op, TransformConfig};

/// Allowed pickup positions.
pub const POSITION: [&str; 3] = ["neck", "middle", "bridge"];
/// Allowed pickup coil types.
pub const COIL: [&str; 2] = ["single-coil", "humbucker"];
/// Allowed pickup magnets.
pub const MAGNET: [&str; 4] = ["alnico-5", "alnico-2", "ceramic", "unknown"];
/// Allowed pickup circuits.
pub const CIRCUIT: [&str; 2] = ["active", "passive"];

/// The fixture schemas, shared.
#[derive(Debug, Clone)]
pub struct Fixtures {
    /// A single pickup.
    pub pickup: Arc<TypeSpec>,
    /// A guitar with at least one pickup.
    pub guitar: Arc<TypeSpec>,
    /// Make, model, year and pickup count of a guitar.
    pub summary: Arc<TypeSpec>,
}

impl Fixtures {
    /// Define every fixture schema.
    pub fn load() -> Result<Self, TypeSpecError> {
        let pickup = TypeSpec::init("Pickup")?
            .prop("position", Predicate::either(POSITION))?
            .prop("make", Predicate::nonempty_string())?
            .prop("model", Predicate::nonempty_string())?
            .prop("color", Predicate::nonempty_string())?
            .prop("coil", Predicate::either(COIL))?
            .prop("magnet", Predicate::either(MAGNET))?
            .prop("circuit", Predicate::either(CIRCUIT))?
            .shared();

        let guitar = TypeSpec::init("Guitar")?
            .prop("make", Predicate::nonempty_string())?
            .prop("model", Predicate::nonempty_string())?
            .prop("color", Predicate::nonempty_string())?
            .prop("year", Predicate::unsigned_int())?
            .prop("pickups", Predicate::array_of(&pickup, false))?
            .shared();

        let summary = TypeSpec::init("GuitarSummary")?
            .prop("make", Predicate::nonempty_string())?
            .prop("model", Predicate::nonempty_string())?
            .prop("year", Predicate::unsigned_int())?
            .prop("pickupCount", Predicate::unsigned_int())?
            .shared();

        Ok(Self {
            pickup,
            guitar,
            summary,
        })
    }

    /// Compile the pickup and guitar schemas.
    pub fn compiled(&self) -> CompiledFixtures {
        CompiledFixtures {
            pickup: self.pickup.build(),
            guitar: self.guitar.build(),
        }
    }

    /// `Guitar` to `GuitarSummary`, counting pickups.
    pub fn summary_op(&self) -> Result<Op, TypeSpecError> {
        Op::init(Arc::clone(&self.guitar), Arc::clone(&self.summary)).onto_result(
            TransformConfig::whole(|scope| {
                let count = scope.result["pickups"].as_array().map_or(0, Vec::len);
                let mut summary = scope.result.clone();
                summary["pickupCount"] = json!(count);
                Ok(summary)
            }),
        )
    }
}

/// Compiled counterparts of the pickup and guitar schemas.
#[derive(Debug, Clone)]
pub struct CompiledFixtures {
    /// Compiled `Pickup`.
    pub pickup: CompiledSpec,
    /// Compiled `Guitar`.
    pub guitar: CompiledSpec,
}

/// The sample guitars.
pub fn guitars() -> Value {
    json!([
        {
            "make": "Ibanez",
            "model": "GRX20L",
            "year": 2001,
            "color": "black",
            "pickups": [
                {
                    "make": "Jackson USA",
                    "model": "Unknown",
                    "color": "Black",
                    "position": "neck",
                    "magnet": "unknown",
                    "coil": "humbucker",
                    "circuit": "passive"
                },
                {
                    "make": "Seymour Duncan",
                    "model": "SH-4",
                    "color": "Black",
                    "position": "bridge",
                    "magnet": "alnico-5",
                    "coil": "humbucker",
                    "circuit": "passive"
                }
            ]
        },
        {
            "make": "Schecter",
            "model": "Omen",
            "year": 2002,
            "color": "black",
            "pickups": [
                {
                    "make": "DiMarzio",
                    "model": "Evolution Neck",
                    "color": "Chrome",
                    "position": "neck",
                    "coil": "humbucker",
                    "circuit": "passive",
                    "magnet": "ceramic"
                },
                {
                    "make": "DiMarzio",
                    "model": "SH-JB",
                    "color": "Black",
                    "position": "bridge",
                    "coil": "humbucker",
                    "circuit": "passive",
                    "magnet": "alnico-5"
                }
            ]
        },
        {
            "make": "Fender",
            "model": "Standard Starocaster",
            "year": 2003,
            "color": "black/white",
            "pickups": [
                {
                    "make": "DiMarzio",
                    "model": "YJM",
                    "color": "Black",
                    "position": "neck",
                    "coil": "humbucker",
                    "circuit": "passive",
                    "magnet": "alnico-5"
                },
                {
                    "make": "Seymour Duncan",
                    "model": "JB Jr.",
                    "color": "Black",
                    "position": "middle",
                    "coil": "humbucker",
                    "circuit": "passive",
                    "magnet": "ceramic"
                },
                {
                    "make": "Seymour Duncan",
                    "model": "Hot Rails.",
                    "color": "Black",
                    "position": "bridge",
                    "coil": "humbucker",
                    "circuit": "passive",
                    "magnet": "ceramic"
                }
            ]
        }
    ])
}
