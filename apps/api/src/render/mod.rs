//! Letter preview rendering — LaTeX → PDF → PNG.
//!
//! Independent of the generation pipeline; every failure (missing toolchain,
//! compile error) degrades to "no preview available" (`None`).

use std::path::{Path, PathBuf};

use tokio::process::Command;
use tracing::{debug, warn};
use uuid::Uuid;

/// LaTeX letter document wrapping the generated text. `{content}` is filled
/// after escaping.
const LETTER_TEMPLATE: &str = r"\documentclass[12pt]{letter}
\usepackage[utf8]{inputenc}
\usepackage{geometry}
\geometry{margin=1in}
\begin{document}
\begin{letter}{}
{content}
\end{letter}
\end{document}
";

/// Raster resolution of the preview image.
const PREVIEW_DPI: &str = "200";

/// Renders `letter_text` to a PNG preview under `preview_dir`. Returns the
/// image path, or `None` when rendering is unavailable or fails.
pub async fn render_preview(preview_dir: &Path, letter_text: &str) -> Option<PathBuf> {
    match try_render(preview_dir, letter_text).await {
        Ok(path) => Some(path),
        Err(e) => {
            warn!("Preview rendering failed: {e}");
            None
        }
    }
}

async fn try_render(preview_dir: &Path, letter_text: &str) -> anyhow::Result<PathBuf> {
    tokio::fs::create_dir_all(preview_dir).await?;

    let stem = format!("cover-letter-{}", Uuid::new_v4());
    let document = fill_template(letter_text);
    tokio::fs::write(preview_dir.join(format!("{stem}.tex")), document).await?;

    run_step(
        Command::new("pdflatex")
            .arg("-interaction=nonstopmode")
            .arg(format!("{stem}.tex"))
            .current_dir(preview_dir),
        "pdflatex",
    )
    .await?;

    run_step(
        Command::new("pdftoppm")
            .arg("-png")
            .arg("-r")
            .arg(PREVIEW_DPI)
            .arg("-f")
            .arg("1")
            .arg("-singlefile")
            .arg(format!("{stem}.pdf"))
            .arg(&stem)
            .current_dir(preview_dir),
        "pdftoppm",
    )
    .await?;

    let image_path = preview_dir.join(format!("{stem}.png"));
    debug!("Rendered preview at {}", image_path.display());
    Ok(image_path)
}

fn fill_template(letter_text: &str) -> String {
    LETTER_TEMPLATE.replace("{content}", &escape_latex(letter_text))
}

/// Escapes TeX special characters in model-generated text.
fn escape_latex(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str(r"\&"),
            '%' => out.push_str(r"\%"),
            '$' => out.push_str(r"\$"),
            '#' => out.push_str(r"\#"),
            '_' => out.push_str(r"\_"),
            '{' => out.push_str(r"\{"),
            '}' => out.push_str(r"\}"),
            '~' => out.push_str(r"\textasciitilde{}"),
            '^' => out.push_str(r"\textasciicircum{}"),
            '\\' => out.push_str(r"\textbackslash{}"),
            _ => out.push(c),
        }
    }
    out
}

async fn run_step(command: &mut Command, name: &str) -> anyhow::Result<()> {
    let output = command
        .output()
        .await
        .map_err(|e| anyhow::anyhow!("failed to launch {name}: {e}"))?;
    if !output.status.success() {
        anyhow::bail!(
            "{name} exited with {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_latex_handles_common_specials() {
        assert_eq!(
            escape_latex("Profit & loss up 10% on #1 market_share"),
            r"Profit \& loss up 10\% on \#1 market\_share"
        );
    }

    #[test]
    fn test_escape_latex_handles_braces_and_backslash() {
        assert_eq!(escape_latex(r"{a}\b"), r"\{a\}\textbackslash{}b");
    }

    #[test]
    fn test_escape_latex_passes_plain_text_through() {
        let text = "Dear Hiring Manager,\nI am writing to apply.";
        assert_eq!(escape_latex(text), text);
    }

    #[test]
    fn test_template_carries_a_content_placeholder() {
        assert!(LETTER_TEMPLATE.contains("{content}"));
        assert!(LETTER_TEMPLATE.contains(r"\documentclass[12pt]{letter}"));
    }

    #[test]
    fn test_fill_template_embeds_escaped_letter() {
        let document = fill_template("Savings of $5 & more");
        assert!(document.contains(r"Savings of \$5 \& more"));
        assert!(!document.contains("{content}"));
        assert!(document.contains(r"\end{document}"));
    }
}
