//
//  vika
//  cli/space.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Space commands
//!
//! Lists the spaces a token can see and browses the file tree inside one,
//! which is how datasheet ids are usually discovered.

use anyhow::Result;
use clap::{Args, Subcommand};
use console::style;
use serde::Serialize;

use crate::api::space::{NodeDetail, NodeInfo, SpaceInfo};
use crate::output::{format_bool, print_field, OutputFormat, OutputWriter, TableBuilder, TableOutput};

use super::{build_client, GlobalOptions};

/// Browse spaces and their nodes
#[derive(Args, Debug)]
pub struct SpaceCommand {
    #[command(subcommand)]
    pub command: SpaceSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum SpaceSubcommand {
    /// List spaces
    #[command(visible_alias = "ls")]
    List,

    /// List the top-level nodes of a space
    Nodes(NodesArgs),

    /// View a node and its children
    Node(NodeArgs),
}

#[derive(Args, Debug)]
pub struct NodesArgs {
    /// Space id (spcXXXX)
    pub space: String,
}

#[derive(Args, Debug)]
pub struct NodeArgs {
    /// Space id (spcXXXX)
    pub space: String,

    /// Node id (dstXXXX, fodXXXX, ...)
    pub node: String,
}

// Display Types

#[derive(Debug, Serialize)]
#[serde(transparent)]
struct SpaceTable(Vec<SpaceInfo>);

impl TableOutput for SpaceTable {
    fn print_table(&self, color: bool) {
        if self.0.is_empty() {
            println!("No spaces found");
            return;
        }
        TableBuilder::new()
            .color(color)
            .headers(["ID", "NAME", "ADMIN"])
            .rows(self.0.iter().map(|space| {
                vec![
                    space.id.clone(),
                    space.name.clone(),
                    format_bool(space.is_admin, color),
                ]
            }))
            .print();
    }
}

#[derive(Debug, Serialize)]
#[serde(transparent)]
struct NodeTable(Vec<NodeInfo>);

impl TableOutput for NodeTable {
    fn print_table(&self, color: bool) {
        print_nodes(&self.0, color);
    }
}

fn print_nodes(nodes: &[NodeInfo], color: bool) {
    if nodes.is_empty() {
        println!("No nodes found");
        return;
    }
    TableBuilder::new()
        .color(color)
        .headers(["ID", "NAME", "TYPE", "FAVORITE"])
        .rows(nodes.iter().map(|node| {
            vec![
                node.id.clone(),
                node.name.clone(),
                node.node_type.clone(),
                format_bool(node.is_fav, color),
            ]
        }))
        .print();
}

#[derive(Debug, Serialize)]
#[serde(transparent)]
struct NodeView(NodeDetail);

impl TableOutput for NodeView {
    fn print_table(&self, color: bool) {
        let node = &self.0.node;
        let title = if color {
            style(&node.name).bold().to_string()
        } else {
            node.name.clone()
        };

        println!("{}", title);
        println!();
        print_field("ID", &node.id, color);
        print_field("Type", &node.node_type, color);
        if let Some(icon) = &node.icon {
            print_field("Icon", icon, color);
        }
        print_field("Favorite", &format_bool(node.is_fav, color), color);

        if !self.0.children.is_empty() {
            println!();
            print_nodes(&self.0.children, color);
        }
    }
}

impl SpaceCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        let client = build_client(global)?;
        let writer = OutputWriter::new(OutputFormat::from_json_flag(global.json));

        match &self.command {
            SpaceSubcommand::List => {
                let spaces = client.spaces().await?;
                writer.write(&SpaceTable(spaces))
            }
            SpaceSubcommand::Nodes(args) => {
                let nodes = client.space(&args.space).nodes().await?;
                writer.write(&NodeTable(nodes))
            }
            SpaceSubcommand::Node(args) => {
                let detail = client.space(&args.space).node(&args.node).await?;
                writer.write(&NodeView(detail))
            }
        }
    }
}
