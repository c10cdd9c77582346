// Terminal front-end for the farm planner
//
// Usage: cargo run --bin planner -- plan --set Soil_pH=7.2 --set land_area=25
// One subcommand per page: planner, dashboard, crop/yield predictors and
// their result pages, risk analysis, optimizer, and saved plan history.

use std::path::Path;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use farm_planner::config::CliConfig;
use farm_planner::forms::{set_condition_field, parse_assignment, yield_prefill, ConditionsForm, PlannerForm};
use farm_planner::model::{
    AllocationRequest, FarmConditions, FarmPlanResult, YieldPrediction, YieldRequest,
};
use farm_planner::presentation::{dashboard, risk_view, yield_view, MissingState, TerminalFormatter};
use farm_planner::session::{FileStorage, Handoff, HandoffSlot, PlanContext};
use farm_planner::validation::{validate_conditions, validate_resources};
use farm_planner::{BackendClient, FieldErrors, PlansClient};

/// Crop used by the yield predictor when nothing was handed over.
const DEFAULT_YIELD_CROP: &str = "Rice";

#[derive(Parser, Debug)]
#[command(name = "planner", version, about = "Crop planning backed by the KisanSaathi ML service")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug, Clone, Default)]
struct FieldArgs {
    /// Override a form field, e.g. --set Soil_Type=Clay (repeatable)
    #[arg(long = "set", value_name = "FIELD=VALUE")]
    set: Vec<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate the planner form, generate a plan and show the dashboard
    Plan {
        #[command(flatten)]
        fields: FieldArgs,
    },
    /// Show the last generated plan
    Dashboard,
    /// Forget the last generated plan
    Clear,
    /// Predict the best crop for the given conditions
    PredictCrop {
        #[command(flatten)]
        fields: FieldArgs,
    },
    /// Show the last crop prediction
    CropResult {
        /// Carry the conditions and crop over to the yield predictor
        #[arg(long)]
        to_yield: bool,
    },
    /// Forecast yield and profit for one crop
    PredictYield {
        #[arg(long)]
        crop: Option<String>,
        #[arg(long)]
        acres: Option<f64>,
        #[command(flatten)]
        fields: FieldArgs,
    },
    /// Show the last yield forecast
    YieldResult,
    /// Run a risk analysis for the given conditions
    Risk {
        #[command(flatten)]
        fields: FieldArgs,
    },
    /// Show the last risk analysis
    RiskResult,
    /// Allocate land across candidate crops within resource limits
    Optimize {
        /// Candidate crop (repeatable)
        #[arg(long = "crop", required = true)]
        crops: Vec<String>,
        #[command(flatten)]
        fields: FieldArgs,
    },
    /// Generate a plan through the relay server and save it
    Save {
        #[arg(long)]
        farmer: Option<String>,
        /// Caller-chosen id; repeating it returns the already saved plan
        #[arg(long)]
        request_id: Option<String>,
        #[command(flatten)]
        fields: FieldArgs,
    },
    /// List saved plans, newest first
    History,
    /// Show one saved plan
    Show { id: Uuid },
    /// Delete a saved plan
    Delete { id: Uuid },
}

/// Submission blocked by field validation.
#[derive(Debug, thiserror::Error)]
#[error("Please fix the highlighted fields")]
struct InvalidFields(FieldErrors);

struct Session {
    plan: PlanContext<FileStorage>,
    handoff: Handoff<FileStorage>,
}

impl Session {
    fn open(state_dir: &Path) -> Self {
        Self {
            plan: PlanContext::hydrate(FileStorage::new(state_dir.join("local"))),
            handoff: Handoff::new(FileStorage::new(state_dir.join("session"))),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "farm_planner=warn".into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = CliConfig::from_env();
    tracing::debug!(?cli, ?config, "starting planner");

    if let Err(e) = run(cli.command, &config).await {
        match e.downcast_ref::<InvalidFields>() {
            Some(InvalidFields(errors)) => eprint!("{}", TerminalFormatter::field_errors(errors)),
            None => eprint!("{}", TerminalFormatter::error_card(&e.to_string())),
        }
        std::process::exit(1);
    }
    Ok(())
}

async fn run(command: Command, config: &CliConfig) -> Result<()> {
    let mut session = Session::open(&config.state_dir);

    match command {
        Command::Plan { fields } => {
            let mut form = PlannerForm::new();
            form.apply(&fields.set)?;
            let input = form.submit().map_err(InvalidFields)?;

            let backend = BackendClient::new(&config.backend_url)?;
            let result = backend.generate_farm_plan(&input).await?;
            print!("{}", TerminalFormatter::dashboard(&dashboard(&result)));
            session.plan.set_farm_plan(result, input);
        }

        Command::Dashboard => match session.plan.result() {
            Some(result) => print!("{}", TerminalFormatter::dashboard(&dashboard(result))),
            None => print!("{}", TerminalFormatter::missing_state(MissingState::Dashboard)),
        },

        Command::Clear => {
            session.plan.clear_farm_plan();
            println!("Farm plan cleared.");
        }

        Command::PredictCrop { fields } => {
            let mut form = ConditionsForm::new();
            form.apply(&fields.set)?;
            let conditions = form.submit().map_err(InvalidFields)?;

            let backend = BackendClient::new(&config.backend_url)?;
            let crop = backend.predict_crop(&conditions).await?.recommended_crop;

            session.handoff.write(HandoffSlot::CropResult, &crop)?;
            session
                .handoff
                .write(HandoffSlot::CropPrefillForYield, &yield_prefill(&conditions, &crop))?;
            print!("{}", TerminalFormatter::crop_result(&crop));
        }

        Command::CropResult { to_yield } => match session.handoff.read::<String>(HandoffSlot::CropResult) {
            Some(crop) => {
                print!("{}", TerminalFormatter::crop_result(&crop));
                if to_yield {
                    session
                        .handoff
                        .copy(HandoffSlot::CropPrefillForYield, HandoffSlot::YieldPrefill)?;
                    println!("Conditions carried over. Run `planner predict-yield` to forecast.");
                }
            }
            None => print!("{}", TerminalFormatter::missing_state(MissingState::CropResult)),
        },

        Command::PredictYield { crop, acres, fields } => {
            let mut request = session
                .handoff
                .read::<YieldRequest>(HandoffSlot::YieldPrefill)
                .unwrap_or_else(|| yield_prefill(&FarmConditions::default(), DEFAULT_YIELD_CROP));
            for assignment in &fields.set {
                let (name, raw) = parse_assignment(assignment)?;
                set_condition_field(&mut request.conditions, name, raw)?;
            }
            if let Some(crop) = crop {
                request.crop_name = crop;
            }
            if let Some(acres) = acres {
                request.acres = acres;
            }

            let errors = validate_conditions(&request.conditions);
            if !errors.is_empty() {
                return Err(InvalidFields(errors).into());
            }

            let backend = BackendClient::new(&config.backend_url)?;
            let prediction = backend.predict_yield(&request).await?;
            session.handoff.write(HandoffSlot::YieldResult, &prediction)?;
            print!("{}", TerminalFormatter::yield_result(&yield_view(&prediction)));
        }

        Command::YieldResult => match session.handoff.read::<YieldPrediction>(HandoffSlot::YieldResult) {
            Some(prediction) => print!("{}", TerminalFormatter::yield_result(&yield_view(&prediction))),
            None => print!("{}", TerminalFormatter::missing_state(MissingState::YieldResult)),
        },

        Command::Risk { fields } => {
            // The risk page submits without range validation
            let mut form = PlannerForm::new();
            form.apply(&fields.set)?;

            let backend = BackendClient::new(&config.backend_url)?;
            let result = backend.generate_farm_plan(form.values()).await?;
            session.handoff.write(HandoffSlot::RiskResult, &result)?;
            print!("{}", TerminalFormatter::risk(&risk_view(&result)));
        }

        Command::RiskResult => match session.handoff.read::<FarmPlanResult>(HandoffSlot::RiskResult) {
            Some(result) => print!("{}", TerminalFormatter::risk(&risk_view(&result))),
            None => print!("{}", TerminalFormatter::missing_state(MissingState::RiskResult)),
        },

        Command::Optimize { crops, fields } => {
            let mut form = PlannerForm::new();
            form.apply(&fields.set)?;
            let resources = form.values().resources.clone();
            let errors = validate_resources(&resources);
            if !errors.is_empty() {
                return Err(InvalidFields(errors).into());
            }

            let backend = BackendClient::new(&config.backend_url)?;
            let request = AllocationRequest {
                resources,
                crop_names: crops,
            };
            let result = backend.optimize_allocation(&request).await?;
            print!("{}", TerminalFormatter::allocation(&result));
        }

        Command::Save { farmer, request_id, fields } => {
            let mut form = PlannerForm::new();
            form.apply(&fields.set)?;
            let input = form.submit().map_err(InvalidFields)?;

            let mut body = serde_json::to_value(&input)?;
            if let Value::Object(map) = &mut body {
                if let Some(farmer) = farmer {
                    map.insert("farmerName".to_string(), Value::String(farmer));
                }
                if let Some(request_id) = request_id {
                    map.insert("requestId".to_string(), Value::String(request_id));
                }
            }

            let plans = PlansClient::new(&config.server_url)?;
            let record = plans.generate(&body).await?;
            print!("{}", TerminalFormatter::record(&record));
        }

        Command::History => {
            let plans = PlansClient::new(&config.server_url)?;
            print!("{}", TerminalFormatter::history(&plans.list().await?));
        }

        Command::Show { id } => {
            let plans = PlansClient::new(&config.server_url)?;
            print!("{}", TerminalFormatter::record(&plans.get(id).await?));
        }

        Command::Delete { id } => {
            let plans = PlansClient::new(&config.server_url)?;
            println!("{}", plans.delete(id).await?);
        }
    }

    Ok(())
}
