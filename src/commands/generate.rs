//! Generate static files

use anyhow::Result;

use crate::generator::{GenerateReport, Generator};
use crate::prismic::ContentService;
use crate::Site;

/// Generate the static site, skipping routes still inside their window
pub async fn run(site: &Site, service: &dyn ContentService, force: bool) -> Result<GenerateReport> {
    let start = std::time::Instant::now();

    let generator = Generator::new(site)?;
    let report = generator.generate(service, force).await?;

    tracing::info!(
        "Generated {} routes, skipped {} fresh, removed {} stale",
        report.generated.len(),
        report.skipped.len(),
        report.removed.len()
    );
    let duration = start.elapsed();
    tracing::info!("Generated in {:.2}s", duration.as_secs_f64());

    Ok(report)
}
