use std::sync::Arc;

use omegapick_agent::{client_from_config, ComparisonRuntime, DisabledLlm, LlmClient};
use omegapick_core::comparison::ComparisonEngine;
use omegapick_core::domain::comparison::ComparisonRequest;
use omegapick_core::domain::profile::UserProfile;
use omegapick_core::errors::ApplicationError;
use uuid::Uuid;

use super::{load_catalog, CommandResult, EXIT_INTERNAL, EXIT_INVALID_INPUT};
use crate::CompareArgs;

pub fn run(args: CompareArgs) -> CommandResult {
    let (config, catalog) = match load_catalog("compare") {
        Ok(loaded) => loaded,
        Err(failure) => return failure,
    };

    let client: Arc<dyn LlmClient> = if args.offline {
        Arc::new(DisabledLlm::new("offline mode: language model skipped"))
    } else {
        match client_from_config(&config.llm) {
            Ok(client) => client,
            Err(error) => {
                return CommandResult::failure(
                    "compare",
                    "llm_client",
                    error.to_string(),
                    EXIT_INTERNAL,
                )
            }
        }
    };

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                "compare",
                "runtime_init",
                format!("failed to initialize async runtime: {error}"),
                EXIT_INTERNAL,
            )
        }
    };

    let engine = ComparisonEngine::new(Arc::new(catalog));
    let comparison = ComparisonRuntime::with_client(engine, client);
    let correlation_id = Uuid::new_v4().to_string();
    let request = request_from_args(args);

    match runtime.block_on(comparison.compare(request, &correlation_id)) {
        Ok(response) => {
            let message = if response.used_fallback {
                format!("deterministic recommendation: {}", response.gpt_json.winner)
            } else {
                format!("generated recommendation: {}", response.gpt_json.winner)
            };
            CommandResult::success("compare", message, response)
        }
        Err(ApplicationError::Domain(error)) => CommandResult::failure(
            "compare",
            "invalid_input",
            error.client_message(),
            EXIT_INVALID_INPUT,
        ),
        Err(error) => {
            CommandResult::failure("compare", "internal", error.to_string(), EXIT_INTERNAL)
        }
    }
}

fn request_from_args(args: CompareArgs) -> ComparisonRequest {
    ComparisonRequest {
        profile: Some(UserProfile {
            age: args.age,
            gender: args.gender,
            meds: args.meds,
            concerns: args.concerns,
            budget: args.budget,
            current_supplements: args.current_supplements,
        }),
        product_a: Some(args.product_a),
        product_b: Some(args.product_b),
    }
}
