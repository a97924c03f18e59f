//! # Endpoint Scaffolding
//!
//! Adds a new endpoint to the TypeScript sources of a project:
//!
//! | Step | File | Adds |
//! |------|------|------|
//! | controller | `src/controllers/<service>Controller.ts` | stub handler function |
//! | route | `src/routes/<service>Routes.ts` | `router.<method>(...)` line |
//! | handler | `src/handlers/<service>Handler.ts` | Lambda proxy export |
//! | template | `template.yaml` | `AWS::Serverless::Function` resource |
//! | entry | `src/app.ts` | route import and `app.use` mount |
//!
//! Every step is skipped when its content is already present.

mod endpoint;
mod generator;
mod templates;

pub use endpoint::{EndpointSpec, GenerateError, HttpMethod};
pub use generator::{Change, GenerateReport, Generator, SourceLayout, Step, StepReport};
