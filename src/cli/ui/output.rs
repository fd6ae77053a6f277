use console::style;

use crate::types::Recommendation;

/// Terminal output helpers; `quiet` suppresses everything but errors
pub struct Output {
    quiet: bool,
}

impl Output {
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }

    pub fn success(&self, message: &str) {
        if !self.quiet {
            println!("{} {}", style("✓").green(), message);
        }
    }

    pub fn error(&self, message: &str) {
        eprintln!("{} {}", style("✗").red(), message);
    }

    pub fn warning(&self, message: &str) {
        if !self.quiet {
            println!("{} {}", style("⚠").yellow(), message);
        }
    }

    pub fn info(&self, message: &str) {
        if !self.quiet {
            println!("{} {}", style("ℹ").blue(), message);
        }
    }

    pub fn header(&self, message: &str) {
        if !self.quiet {
            println!("\n{}", style(message).bold().underlined());
        }
    }

    pub fn field(&self, label: &str, value: impl std::fmt::Display) {
        if !self.quiet {
            println!("  {:<14} {}", style(label).dim(), value);
        }
    }

    /// One recommendation with its resources; `chosen` marks the selection
    pub fn recommendation(&self, rec: &Recommendation, chosen: bool) {
        if self.quiet {
            return;
        }
        let marker = if chosen {
            style("★").yellow().to_string()
        } else {
            " ".to_string()
        };
        println!(
            "\n{} {} {} ({})",
            marker,
            style(&rec.id).dim(),
            style(&rec.title).bold(),
            rec.provider.display_name()
        );
        self.field("confidence", format!("{:.2}", rec.confidence));
        self.field("monthly cost", format!("${:.2}", rec.estimated_monthly_cost));
        if let Some(score) = rec.feedback_score {
            self.field("feedback", format!("{:.3}", score));
        }
        if !rec.description.is_empty() {
            println!("  {}", rec.description);
        }
        for resource in &rec.resources {
            println!(
                "    - {:<20} {:<32} ${:.2}",
                resource.resource_type, resource.service_name, resource.monthly_cost
            );
        }
        for (idx, step) in rec.implementation_steps.iter().enumerate() {
            println!("    {}. {}", idx + 1, step);
        }
    }
}

impl Default for Output {
    fn default() -> Self {
        Self::new(false)
    }
}
