//! Line based terminal front end.

use std::io::{ BufRead, Write };

use itertools::Itertools;
use rand::{ SeedableRng, rngs::StdRng };
use tracing::{ debug, warn };

use crate::{
  error::{ Error, Result },
  input::{ InputField, InputVector },
  lifecycle::NetworkStatus,
  chart::ChartSeries,
  state::AppState,
};

const BAR_WIDTH: usize = 20;
const CHART_HEIGHT: usize = 8;


/// Range control for one reading.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Slider {
  pub field: InputField,
  pub min: f32,
  pub max: f32,
  pub unit: &'static str,
}

/// Controls shown to the user. Time of day has none and keeps its value.
pub const SLIDERS: [Slider; 4] = [
  Slider { field: InputField::Temperature, min: -10.0, max: 45.0, unit: "°C" },
  Slider { field: InputField::CloudCover, min: 0.0, max: 100.0, unit: "%" },
  Slider { field: InputField::WindSpeed, min: 0.0, max: 50.0, unit: "km/h" },
  Slider { field: InputField::Humidity, min: 0.0, max: 100.0, unit: "%" },
];

impl Slider {
  pub fn for_field(field: InputField) -> Option<&'static Self> {
    SLIDERS.iter().find(|slider| slider.field == field )
  }

  /// Nearest value the control can take.

  pub fn constrain(&self, value: f32) -> f32 {
    if value.is_nan() {
      self.min
    } else {
      value.clamp(self.min, self.max)
    }
  }

  pub fn contains(&self, value: f32) -> bool {
    value >= self.min && value <= self.max
  }

  fn bar(&self, value: f32) -> String {
    let ratio = (self.constrain(value) - self.min) / (self.max - self.min);
    let filled = (ratio * BAR_WIDTH as f32).round() as usize;
    format!("{}{}", "#".repeat(filled), "-".repeat(BAR_WIDTH - filled))
  }

  fn render(&self, input: &InputVector) -> String {
    let value = input.get(self.field);
    format!("  {:<12} {:>6.1} {:<5} [{}] {} .. {}",
      self.field.label(), value, self.unit, self.bar(value), self.min, self.max)
  }
}


/// A single line of user input.

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
  Set { field: InputField, value: f32 },
  Predict,
  Chart,
  Status,
  Help,
  Quit,
}

impl Command {
  pub fn parse(line: &str) -> Result<Self> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
      return Err(Error::Command("empty command".into()))
    };

    let command = match verb.to_lowercase().as_str() {
      "set" => {
        let name = words.next()
          .ok_or_else(|| Error::Command("usage: set <field> <value>".into()) )?;
        let field = InputField::parse(name)
          .ok_or_else(|| Error::Command(format!("unknown field '{name}'")) )?;
        if Slider::for_field(field).is_none() {
          return Err(Error::Command(format!("{field} can't be changed")))
        }
        let value = words.next()
          .ok_or_else(|| Error::Command("usage: set <field> <value>".into()) )?;
        let value: f32 = value.parse()
          .map_err(|_| Error::Command(format!("'{value}' is not a number")) )?;
        if !value.is_finite() {
          return Err(Error::Command(format!("'{value}' is not a number")))
        }
        Self::Set { field, value }
      },
      "predict" | "p" => Self::Predict,
      "chart" | "c" => Self::Chart,
      "status" | "s" => Self::Status,
      "help" | "h" | "?" => Self::Help,
      "quit" | "q" | "exit" => Self::Quit,
      other => return Err(Error::Command(format!("unknown command '{other}', try 'help'"))),
    };

    match words.next() {
      Some(extra) => Err(Error::Command(format!("unexpected '{extra}'"))),
      None => Ok(command),
    }
  }
}

const HELP: &str = "\
Commands:
  set <field> <value>  move a slider (temperature, cloud, wind, humidity)
  predict              generate prediction
  chart                show the hourly forecast
  status               show the state of the network
  help                 show this text
  quit                 leave";


/// Full screen: sliders, prediction, network status and chart.

pub fn render(state: &AppState, chart: &ChartSeries) -> String {
  let sliders = SLIDERS.iter().map(|slider| slider.render(state.input()) ).join("\n");
  let mut out = format!("Solar production forecast\n\n{sliders}\n");
  out += &format!("\nPredicted solar production: {}\n", state.displayed_prediction());
  out += &format!("Model: {}\n\nHourly forecast\n", state.status());
  out += &chart.render(CHART_HEIGHT);
  out
}


fn describe_status(status: &NetworkStatus) -> String {
  match status {
    NetworkStatus::Ready(network) => {
      let report = network.report();
      match report.final_loss() {
        Some(loss) => format!("Model ready, {} epochs, final loss {loss:.4}", report.epochs()),
        None => "Model ready, not fitted".into(),
      }
    },
    other => format!("Model {other}"),
  }
}


/// Interactive loop reading commands from `input` and writing screens to `output`.

pub struct Session<R: BufRead, W: Write> {
  state: AppState,
  input: R,
  output: W,
  rng: StdRng,
}

impl<R: BufRead, W: Write> Session<R, W> {
  pub fn new(state: AppState, input: R, output: W) -> Self {
    Self { state, input, output, rng: StdRng::from_entropy() }
  }

  pub fn state(&self) -> &AppState {
    &self.state
  }

  pub fn into_parts(self) -> (AppState, W) {
    (self.state, self.output)
  }

  /// Run until `quit` or end of input.

  pub fn run(&mut self) -> Result<()> {
    let mut line = String::new();
    loop {
      self.state.poll();
      self.show()?;
      write!(self.output, "> ")?;
      self.output.flush()?;

      line.clear();
      if self.input.read_line(&mut line)? == 0 {
        break
      }
      if line.trim().is_empty() {
        continue
      }

      match Command::parse(&line) {
        Ok(Command::Quit) => break,
        Ok(command) => self.dispatch(command)?,
        Err(err) => self.notice(&err)?,
      }
    }
    Ok(())
  }

  fn show(&mut self) -> Result<()> {
    let chart = ChartSeries::generate(&mut self.rng);
    writeln!(self.output, "{}", render(&self.state, &chart))?;
    Ok(())
  }

  fn notice(&mut self, err: &Error) -> Result<()> {
    writeln!(self.output, "! {err}")?;
    Ok(())
  }

  fn dispatch(&mut self, command: Command) -> Result<()> {
    debug!(?command, "Dispatching");
    match command {
      Command::Set { field, value } => {
        // Parsing only admits fields that have a slider
        if let Some(slider) = Slider::for_field(field) {
          let constrained = slider.constrain(value);
          if !slider.contains(value) {
            writeln!(self.output, "{field} limited to {constrained} {}", slider.unit)?;
          }
          self.state.set_input(field, constrained);
        }
      },
      Command::Predict => {
        if let Err(err) = self.state.request_prediction() {
          warn!(%err, "Prediction unavailable");
          self.notice(&err)?;
        }
      },
      Command::Chart => {
        let chart = ChartSeries::generate(&mut self.rng);
        write!(self.output, "{}", chart.render(CHART_HEIGHT))?;
      },
      Command::Status => {
        let status = describe_status(self.state.status());
        writeln!(self.output, "{status}")?;
      },
      Command::Help => writeln!(self.output, "{HELP}")?,
      Command::Quit => {},
    }
    Ok(())
  }
}
