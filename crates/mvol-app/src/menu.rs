//! Interactive A-G menu.
//!
//! Prompts, reads one line per answer and hands parsed input to the
//! [`Orchestrator`]. Operation failures are printed and the menu continues;
//! only failures writing to the output end the loop.

use crate::app::{NewMarket, Orchestrator};
use crate::error::{AppError, AppResult};
use crate::report;
use mvol_core::{parse_series, Metric};
use std::io::{BufRead, Write};
use tracing::error;

const MENU: &str = "Select from the following choices (only write the letter):\n\
A. Add Market\n\
B. View Market\n\
C. Update Market\n\
D. Compare Markets\n\
E. Remove Market\n\
F. Extract Rankings\n\
G. Exit";

pub struct Menu<'a, R, W> {
    orchestrator: &'a mut Orchestrator,
    input: R,
    output: W,
}

impl<'a, R: BufRead, W: Write> Menu<'a, R, W> {
    pub fn new(orchestrator: &'a mut Orchestrator, input: R, output: W) -> Self {
        Self {
            orchestrator,
            input,
            output,
        }
    }

    /// Run until `G` or end of input.
    pub fn run(&mut self) -> AppResult<()> {
        loop {
            writeln!(self.output, "{MENU}")?;
            write!(self.output, "Enter your choice: ")?;
            self.output.flush()?;

            let Some(choice) = self.read_line()? else {
                writeln!(self.output, "No input detected. Exiting.")?;
                return Ok(());
            };

            let result = match choice.trim().to_ascii_uppercase().as_str() {
                "A" => self.add(),
                "B" => self.view(),
                "C" => self.update(),
                "D" => self.compare(),
                "E" => self.remove(),
                "F" => self.rankings(),
                "G" => return Ok(()),
                "" => Ok(()),
                _ => {
                    writeln!(self.output, "Invalid choice. Please enter A, B, C, D, E, F, or G.")?;
                    Ok(())
                }
            };
            self.report(result)?;
            writeln!(self.output)?;
        }
    }

    fn read_line(&mut self) -> AppResult<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    /// Print a question and read the answer. `None` on end of input.
    fn prompt(&mut self, question: &str) -> AppResult<Option<String>> {
        writeln!(self.output, "{question}")?;
        self.output.flush()?;
        self.read_line()
    }

    /// Like `prompt`, but end of input and blank answers become errors.
    fn prompt_name(&mut self, question: &str) -> AppResult<String> {
        let name = self
            .prompt(question)?
            .ok_or_else(|| AppError::validation("No market name provided."))?;
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::validation("Market name cannot be empty."));
        }
        Ok(name.to_string())
    }

    fn prompt_series(&mut self, question: &str) -> AppResult<Vec<f64>> {
        let answer = self
            .prompt(question)?
            .ok_or_else(|| AppError::validation("No market data provided."))?;
        parse_series(&answer).map_err(|_| {
            AppError::validation("Invalid numeric input. Please enter comma-separated numbers only.")
        })
    }

    /// Print an operation failure. Output errors propagate.
    fn report(&mut self, result: AppResult<()>) -> AppResult<()> {
        match result {
            Ok(()) => Ok(()),
            Err(AppError::Io(e)) => Err(AppError::Io(e)),
            Err(e) if e.is_user_error() => {
                writeln!(self.output, "{e}")?;
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Operation failed");
                writeln!(self.output, "The following error occurred: {e}")?;
                Ok(())
            }
        }
    }

    fn add(&mut self) -> AppResult<()> {
        let name = self.prompt_name("Enter the name of the market:")?;
        let rent_growth = self.prompt_series("Enter the rent growth for past 10 years, separated by commas:")?;
        let vacancy = self.prompt_series("Enter the vacancy for past 10 years, separated by commas:")?;
        let cap_rate = self.prompt_series("Enter the cap rate for past 10 years, separated by commas:")?;

        let record = self.orchestrator.add_market(NewMarket {
            name,
            vacancy,
            rent_growth,
            cap_rate,
        })?;
        writeln!(self.output)?;
        write!(self.output, "{}", report::render_added(&record))?;
        Ok(())
    }

    fn view(&mut self) -> AppResult<()> {
        let name = self.prompt_name("Market Name: ")?;
        let view = self.orchestrator.view_market(&name)?;
        writeln!(self.output)?;
        write!(self.output, "{}", report::render_view(&view))?;
        Ok(())
    }

    fn update(&mut self) -> AppResult<()> {
        let name = self.prompt_name("Enter the name of the market you want to update:")?;
        self.orchestrator.find_market(&name)?;

        let choice = self
            .prompt(
                "Enter the metric you want to update:\n\
                 A. Ten Year Rent Growth\n\
                 B. Ten Year Cap Rate\n\
                 C. Ten Year Vacancy",
            )?
            .ok_or_else(|| AppError::validation("No metric selected."))?;
        let metric = match choice.trim().to_ascii_uppercase().as_str() {
            "A" => Metric::RentGrowth,
            "B" => Metric::CapRate,
            "C" => Metric::Vacancy,
            _ => {
                return Err(AppError::validation(
                    "Invalid metric choice. Please enter A, B, or C.",
                ))
            }
        };

        let label = metric.label().to_lowercase();
        let series = self.prompt_series(&format!(
            "Enter the {label} for past 10 years, separated by commas:"
        ))?;
        let national = self.prompt_series(&format!(
            "Enter the national {label} for past 10 years, separated by commas \
             (leave blank to use the national benchmark file):"
        ))?;
        let national = (!national.is_empty()).then_some(national);

        let record = self.orchestrator.update_metric(&name, metric, series, national)?;
        let stats = record.family(metric);
        writeln!(
            self.output,
            "Updated {} for {}: Standard Deviation: {:.2}, CV: {:.2}, Beta: {:.2}",
            metric, record.name, stats.std_dev, stats.cv, stats.beta
        )?;
        Ok(())
    }

    fn compare(&mut self) -> AppResult<()> {
        let answer = self
            .prompt("Enter two markets to compare, separated by commas:")?
            .ok_or_else(|| AppError::validation("No markets provided."))?;
        let names: Vec<&str> = answer.split(',').map(str::trim).collect();
        if names.len() != 2 {
            return Err(AppError::validation(
                "Please enter exactly two market names separated by a comma.",
            ));
        }

        let comparison = self.orchestrator.compare(names[0], names[1])?;
        writeln!(self.output)?;
        write!(self.output, "{}", report::render_comparison(&comparison))?;
        Ok(())
    }

    fn remove(&mut self) -> AppResult<()> {
        let name = self.prompt_name("Enter the market you wish to remove:")?;
        self.orchestrator.remove_market(&name)?;
        writeln!(self.output, "Removed {name}.")?;
        Ok(())
    }

    fn rankings(&mut self) -> AppResult<()> {
        let table = self.orchestrator.extract_rankings()?;
        write!(self.output, "{}", report::render_ranking_table(&table))?;
        Ok(())
    }
}
