use std::{ error::Error, io, path::PathBuf };

use clap::{ Parser, Subcommand };
use tracing::info;

use solarcast::{
  config::{ AppConfig, Overrides },
  ui::{ Session, Slider },
  AppState, InputField, NetworkLifecycle,
};


#[derive(Parser)]
#[command(version, about = "Predict solar production from weather readings")]
struct Cli {
  /// YAML configuration file
  #[arg(short, long, value_name = "PATH")]
  config: Option<PathBuf>,
  /// Seed for weights, training data and shuffling
  #[arg(long, value_name = "INT")]
  seed: Option<u64>,
  /// Passes over the training data
  #[arg(long, value_name = "INT")]
  epochs: Option<usize>,
  /// Increase log output, repeat for more
  #[arg(short, long, action = clap::ArgAction::Count)]
  verbose: u8,
  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
  /// Adjust readings and request predictions interactively
  Interactive,
  /// Fit the network, predict once and print the result
  Predict {
    #[arg(long, allow_negative_numbers = true)]
    temperature: Option<f32>,
    #[arg(long)]
    cloud_cover: Option<f32>,
    #[arg(long)]
    wind_speed: Option<f32>,
    #[arg(long)]
    humidity: Option<f32>,
  },
}


fn main() -> Result<(), Box<dyn Error>> {
  let args = Cli::parse();
  solarcast::logging::init_logging(args.verbose)?;

  let overrides = Overrides { seed: args.seed, epochs: args.epochs };
  let config = AppConfig::load(args.config.as_deref())?.merge(&overrides)?;
  info!(training = ?config.training, "Loaded configuration");

  let lifecycle = NetworkLifecycle::start(config.training);
  let mut state = AppState::new(config.inputs, lifecycle);

  match args.command.unwrap_or(Command::Interactive) {
    Command::Interactive => {
      let stdin = io::stdin();
      let mut session = Session::new(state, stdin.lock(), io::stdout());
      session.run()?;
    },
    Command::Predict { temperature, cloud_cover, wind_speed, humidity } => {
      let readings = [
        (InputField::Temperature, temperature),
        (InputField::CloudCover, cloud_cover),
        (InputField::WindSpeed, wind_speed),
        (InputField::Humidity, humidity),
      ];
      for (field, value) in readings {
        let Some(value) = value else { continue };
        let value = Slider::for_field(field).map_or(value, |slider| slider.constrain(value) );
        state.set_input(field, value);
      }
      state.wait();
      println!("{}", state.request_prediction()?);
    },
  }

  Ok(())
}
