//
//  vika
//  cli/upload.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Attachment upload command

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

use crate::api::datasheet::Attachment;
use crate::config::Config;
use crate::output::{print_field, OutputFormat, OutputWriter, TableOutput};
use crate::util::format_size;

use super::{build_client, resolve_datasheet, GlobalOptions};

/// Upload a file as a datasheet attachment
///
/// The printed attachment object can be written into an attachment cell with
/// `vika record update`.
#[derive(Args, Debug)]
pub struct UploadCommand {
    /// File to upload
    pub file: PathBuf,

    /// Datasheet id (defaults to `default_datasheet`)
    #[arg(long, short = 'd')]
    pub datasheet: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(transparent)]
struct AttachmentView(Attachment);

impl TableOutput for AttachmentView {
    fn print_table(&self, color: bool) {
        let attachment = &self.0;
        let title = if color {
            style(&attachment.name).bold().to_string()
        } else {
            attachment.name.clone()
        };

        println!("{}", title);
        println!();
        print_field("Token", &attachment.token, color);
        print_field("Type", &attachment.mime_type, color);
        print_field("Size", &format_size(attachment.size), color);
        if let (Some(width), Some(height)) = (attachment.width, attachment.height) {
            print_field("Dimensions", &format!("{}x{}", width, height), color);
        }
        if let Some(url) = &attachment.url {
            print_field("URL", url, color);
        }
    }
}

impl UploadCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        let config = Config::load()?;
        let datasheet = resolve_datasheet(self.datasheet.as_deref(), &config)?;
        let client = build_client(global)?;
        let writer = OutputWriter::new(OutputFormat::from_json_flag(global.json));

        let spinner = if writer.is_json() {
            ProgressBar::hidden()
        } else {
            let spinner = ProgressBar::new_spinner();
            spinner.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner:.cyan} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            spinner.set_message(format!("Uploading {}...", self.file.display()));
            spinner.enable_steady_tick(std::time::Duration::from_millis(100));
            spinner
        };

        let result = client.datasheet(datasheet).upload_file(&self.file).await;
        spinner.finish_and_clear();

        let attachment = result?;
        writer.write(&AttachmentView(attachment))
    }
}
