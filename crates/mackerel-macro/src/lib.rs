//! # mackerel-macro - CloudFormation macro for Mackerel resources
//!
//! Lets templates declare `Mackerel::*` resources and hands them over to a custom resource provider.
//!
//! ## Introduction for developers
//!
//! Read this to understand how the macro works internally.
//!
//! ### CloudFormation macros
//!
//! A macro is a Lambda function that CloudFormation calls while processing a template, before any resource is
//! created. CloudFormation sends a request event and expects a response with the (possibly rewritten) template
//! fragment:
//!
//! ```json
//! {
//!   "requestId": "3a0a5b1c-...",
//!   "fragment": {
//!     "Resources": {
//!       "Service": {
//!         "Type": "Mackerel::Service",
//!         "Properties": { "Name": "my-service" }
//!       }
//!     }
//!   }
//! }
//! ```
//!
//! The response echoes `requestId` and carries a `status` of either `"success"` or `"failure"`.
//!
//! ### Rewriting
//!
//! see [transform::transform_in_place]
//!
//! Every resource whose `Type` starts with `Mackerel::` becomes a custom resource:
//!
//! | **field**                 | **before**          | **after**                        |
//! |---------------------------|---------------------|----------------------------------|
//! | `Type`                    | `Mackerel::Service` | `Custom::Service`                |
//! | `Version`                 | -                   | `"1.0"`                          |
//! | `Properties.ServiceToken` | -                   | ARN of the provider Lambda       |
//!
//! All other resources, properties and top level keys are passed through untouched.
//!
//! Validation runs over the whole fragment before anything is written, so a rejected fragment comes back exactly as
//! it was received.
//!
//! ### Configuration
//!
//! The provider ARN is read once at start-up into a [config::MacroConfig] (from `LAMBDA_ARN`) and passed by reference
//! into every invocation. Nothing is read from the environment while handling a request.
//!
//! ### Handling
//!
//! [handler::handle] wraps the transform and collapses every error into `status: "failure"`. The error detail is
//! logged but never returned to CloudFormation.
//!
pub mod config;
pub mod handler;
pub mod transform;
