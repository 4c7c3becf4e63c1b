use crate::agents::RouteDecision;
use crate::dispatch::TaskReceipt;
use crate::inspect::FileMeta;
use crate::testdata::TestDataset;
use crate::workflow::WorkflowPlan;
use colored::*;

pub struct OutputStyle;

impl OutputStyle {
    pub fn title(text: &str) -> ColoredString {
        text.bright_blue().bold()
    }

    pub fn label(text: &str) -> ColoredString {
        text.cyan()
    }

    pub fn success(text: &str) -> ColoredString {
        text.green()
    }

    pub fn error(text: &str) -> ColoredString {
        text.red()
    }

    pub fn warning(text: &str) -> ColoredString {
        text.yellow()
    }

    pub fn info(text: &str) -> ColoredString {
        text.blue()
    }

    pub fn muted(text: &str) -> ColoredString {
        text.dimmed()
    }

    pub fn step(text: &str) -> ColoredString {
        text.bright_green()
    }

    pub fn param(text: &str) -> ColoredString {
        text.bright_yellow()
    }

    pub fn separator() -> String {
        "─".repeat(50)
    }

    pub fn header_separator() -> String {
        "═".repeat(50)
    }

    pub fn print_header(title: &str) {
        println!("{}", Self::title(title));
        println!("{}", Self::header_separator());
    }

    pub fn print_field_colored(label: &str, value: &str, color_fn: impl Fn(&str) -> ColoredString) {
        println!("{:>12}: {}", Self::label(label), color_fn(value));
    }

    pub fn print_route(decision: &RouteDecision) {
        println!(
            "{}",
            Self::muted(&format!(
                "→ routed to {} ({}, confidence {:.2})",
                decision.routing, decision.modality, decision.confidence
            ))
        );
    }

    pub fn print_plan(plan: &WorkflowPlan) {
        Self::print_header(&plan.workflow_name);
        for step in &plan.steps {
            let params = if step.params.is_empty() {
                String::new()
            } else {
                let rendered: Vec<String> = step
                    .params
                    .iter()
                    .map(|(k, v)| format!("{}={}", k, v))
                    .collect();
                format!("  [{}]", rendered.join(", "))
            };
            println!(
                "  {}{}",
                Self::step(&step.name),
                Self::param(&params)
            );
            println!("      {}", Self::muted(&step.desc));
        }
        println!("{}", Self::separator());
    }

    pub fn print_file_meta(meta: &FileMeta) {
        Self::print_header(&meta.filename);
        Self::print_field_colored("Type", meta.file_type.as_str(), Self::info);
        if meta.is_directory {
            Self::print_field_colored("Contents", &meta.files.join(", "), Self::muted);
        } else {
            Self::print_field_colored("Size", &format!("{} MB", meta.size_mb), Self::muted);
        }
        if let Some(cells) = &meta.estimated_cells {
            Self::print_field_colored("Est. cells", cells, Self::success);
        }
        if let Some(genes) = &meta.estimated_genes {
            Self::print_field_colored("Est. genes", genes, Self::success);
        }
    }

    pub fn print_datasets(datasets: &[TestDataset]) {
        if datasets.is_empty() {
            println!("{}", Self::muted("No test datasets available."));
            return;
        }

        Self::print_header("Available test datasets");
        for (i, dataset) in datasets.iter().enumerate() {
            println!(
                "{}. {} {}",
                i + 1,
                Self::step(&dataset.name),
                Self::muted(&format!("(ID: {})", dataset.id))
            );
            println!("   {}", dataset.description);
            if let Some(cells) = &dataset.cells {
                println!("   Cells: {}", cells);
            }
            if let Some(chemistry) = &dataset.chemistry {
                println!("   Chemistry: {}", chemistry);
            }
            if let Some(h5ad) = &dataset.h5ad_file {
                println!("   Converted: {}", h5ad.display());
            }
        }
    }

    pub fn print_receipt(receipt: &TaskReceipt) {
        println!(
            "✅ {}",
            Self::success(&format!(
                "Run {} finished with status '{}'",
                receipt.task_id, receipt.report.status
            ))
        );
        Self::print_field_colored("Output", &receipt.output_dir.display().to_string(), Self::muted);
        for step in &receipt.report.steps_details {
            let marker = if step.status == "ok" || step.status == "success" {
                Self::success(&step.status)
            } else {
                Self::warning(&step.status)
            };
            println!("  {} {}", marker, step.name);
        }
        if let Some(plot) = &receipt.report.final_plot {
            Self::print_field_colored("Final plot", plot, Self::info);
        }
    }
}
