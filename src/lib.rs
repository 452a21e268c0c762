//! # restive
//!
//! > **Remote REST resources that behave like local records.**
//!
//! This crate maps remote HTTP resources onto schema-less local records:
//! association traversal (belongs-to / has-many / has-one), attribute
//! coercion, validation hooks, cascading nested saves, and dynamic finder
//! dispatch. The remote service stays the source of truth — a record is a
//! typed window onto it, not a cache with invalidation.
//!
//! ## Core Concepts
//!
//! ### Declarations over dispatch
//! Associations are declared once per resource on a [`Schema`]
//! ([`schema::SchemaBuilder`]), which derives an accessor table at
//! registration time. Reading `gender_id` on a record is a table lookup
//! that knows it is the id side of a belongs-to — there is no name-pattern
//! matching at read time, and declarations never leak between resources.
//!
//! ### The store is the cache
//! Association getters resolve lazily (possibly fetching remotely) and
//! write the result back into the record's attribute store. A second read
//! is a plain attribute hit; assigning through the setter is what
//! invalidates.
//!
//! ### Collaborator seams
//! The HTTP transport ([`transport::Transport`]) and the wire codec
//! ([`format::WireFormat`]) are trait seams. `reqwest` and JSON
//! implementations are bundled; tests run against
//! [`transport::MockTransport`], which serves canned responses and refuses
//! anything unregistered.
//!
//! ## Module Tour
//!
//! - [`schema`]: per-resource declaration registries, built once.
//! - [`record`]: the record itself — attributes, associations, lifecycle,
//!   nested persistence, serialization.
//! - [`resource`]: class-level handles (find, create, dynamic finders).
//! - [`client`]: transport + format + registry, wired once at startup.
//! - [`transport`], [`format`]: the collaborator seams and their bundled
//!   implementations.
//! - [`hooks`]: validation/save hooks shared per resource class.
//!
//! ## Quick Start
//!
//! ```ignore
//! use restive::{Client, HttpTransport, Schema};
//! use serde_json::json;
//!
//! let client = Client::builder(HttpTransport::new("http://localhost:3000"))
//!     .register(Schema::builder("patient").belongs_to("gender").build())
//!     .register(Schema::builder("gender").build())
//!     .build();
//!
//! let patients = client.resource("patient")?;
//! let mut patient = patients.build(json!({ "name": "Ada", "gender_id": "1" }))?;
//! patient.save().await?;                       // POST /patients.json
//! let gender = patient.read("gender").await?;  // GET /genders/1.json, cached
//! # Ok::<(), restive::Error>(())
//! ```

pub mod attributes;
pub mod client;
pub mod errors;
pub mod finder;
pub mod format;
pub mod hooks;
pub mod inflect;
pub mod paths;
pub mod record;
pub mod resource;
pub mod schema;
pub mod trace;
pub mod transport;
pub mod value;

pub use attributes::AttributeStore;
pub use client::{Client, ClientBuilder};
pub use errors::{Error, ValidationErrors};
pub use finder::Found;
pub use format::{FormatError, JsonFormat, WireFormat};
pub use hooks::{Hooks, NoHooks};
pub use record::{NestedOutcome, Record};
pub use resource::Resource;
pub use schema::{Accessor, NestedResource, Registry, Schema, SchemaBuilder};
pub use trace::setup_tracing;
pub use transport::{
    Headers, HttpTransport, Method, MockTransport, Response, Transport, TransportError,
};
pub use value::Value;
