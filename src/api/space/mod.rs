//
//  vika
//  api/space/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Spaces and their file nodes.
//!
//! A space is a workspace; nodes are the folders, datasheets and forms inside
//! it. Space listing lives on [`VikaClient::spaces`]; node operations on
//! [`Space`].

use serde::{Deserialize, Serialize};

use super::client::VikaClient;
use super::common::Result;
use super::request::{require_id, ApiRequest, HttpMethod};

/// A space visible to the token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpaceInfo {
    pub id: String,
    pub name: String,
    /// Whether the token's owner administers the space.
    #[serde(default)]
    pub is_admin: bool,
}

/// A node in a space's file tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeInfo {
    pub id: String,
    pub name: String,
    /// `Folder`, `Datasheet`, `Form`, `Dashboard` or `Mirror`.
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default)]
    pub is_fav: bool,
}

/// A node with its direct children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDetail {
    #[serde(flatten)]
    pub node: NodeInfo,
    /// Only folders have children.
    #[serde(default)]
    pub children: Vec<NodeInfo>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpaceList {
    #[serde(default)]
    pub spaces: Vec<SpaceInfo>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NodeList {
    #[serde(default)]
    pub nodes: Vec<NodeInfo>,
}

/// `GET /fusion/v1/spaces`
#[derive(Debug, Clone, Copy)]
pub struct DescribeSpaces;

impl ApiRequest for DescribeSpaces {
    type Response = SpaceList;

    fn method(&self) -> HttpMethod {
        HttpMethod::Get
    }

    fn path(&self) -> String {
        "/fusion/v1/spaces".to_string()
    }
}

/// `GET /fusion/v1/spaces/{spaceId}/nodes`
#[derive(Debug, Clone)]
pub struct DescribeNodes {
    pub space_id: String,
}

impl ApiRequest for DescribeNodes {
    type Response = NodeList;

    fn method(&self) -> HttpMethod {
        HttpMethod::Get
    }

    fn path(&self) -> String {
        format!("/fusion/v1/spaces/{}/nodes", self.space_id)
    }

    fn validate(&self) -> Result<()> {
        require_id("space", &self.space_id)
    }
}

/// `GET /fusion/v1/spaces/{spaceId}/nodes/{nodeId}`
#[derive(Debug, Clone)]
pub struct DescribeNode {
    pub space_id: String,
    pub node_id: String,
}

impl ApiRequest for DescribeNode {
    type Response = NodeDetail;

    fn method(&self) -> HttpMethod {
        HttpMethod::Get
    }

    fn path(&self) -> String {
        format!("/fusion/v1/spaces/{}/nodes/{}", self.space_id, self.node_id)
    }

    fn validate(&self) -> Result<()> {
        require_id("space", &self.space_id)?;
        require_id("node", &self.node_id)
    }
}

/// Handle for the node operations of one space.
#[derive(Debug, Clone)]
pub struct Space {
    client: VikaClient,
    space_id: String,
}

impl Space {
    pub(crate) fn new(client: VikaClient, space_id: String) -> Self {
        Self { client, space_id }
    }

    pub fn id(&self) -> &str {
        &self.space_id
    }

    /// Lists the top-level nodes of the space.
    pub async fn nodes(&self) -> Result<Vec<NodeInfo>> {
        let response = self
            .client
            .send(DescribeNodes {
                space_id: self.space_id.clone(),
            })
            .await?;
        Ok(response.nodes)
    }

    /// Describes one node and its children.
    pub async fn node(&self, node_id: &str) -> Result<NodeDetail> {
        self.client
            .send(DescribeNode {
                space_id: self.space_id.clone(),
                node_id: node_id.to_string(),
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::client::test_client;
    use crate::api::common::VikaError;

    #[tokio::test]
    async fn test_nodes() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/fusion/v1/spaces/spc1/nodes")
            .with_body(
                r#"{"code": 200, "success": true, "message": "SUCCESS", "data": {"nodes": [
                    {"id": "fod1", "name": "Projects", "type": "Folder", "isFav": true},
                    {"id": "dst1", "name": "Tasks", "type": "Datasheet", "icon": "memo"}
                ]}}"#,
            )
            .create_async()
            .await;

        let nodes = test_client(&server.url()).space("spc1").nodes().await.unwrap();

        assert_eq!(nodes.len(), 2);
        assert!(nodes[0].is_fav);
        assert_eq!(nodes[1].node_type, "Datasheet");
        assert_eq!(nodes[1].icon.as_deref(), Some("memo"));
    }

    #[tokio::test]
    async fn test_node_detail_with_children() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/fusion/v1/spaces/spc1/nodes/fod1")
            .with_body(
                r#"{"code": 200, "success": true, "message": "SUCCESS", "data": {
                    "id": "fod1", "name": "Projects", "type": "Folder", "isFav": false,
                    "children": [{"id": "dst2", "name": "Roadmap", "type": "Datasheet", "isFav": false}]
                }}"#,
            )
            .create_async()
            .await;

        let detail = test_client(&server.url())
            .space("spc1")
            .node("fod1")
            .await
            .unwrap();

        assert_eq!(detail.node.name, "Projects");
        assert_eq!(detail.children.len(), 1);
        assert_eq!(detail.children[0].id, "dst2");
    }

    #[tokio::test]
    async fn test_blank_node_id_rejected() {
        let client = test_client("http://127.0.0.1:1");
        let err = client.space("spc1").node(" ").await.unwrap_err();
        assert!(matches!(err, VikaError::LocalValidation(_)));
    }

    #[test]
    fn test_paths() {
        assert_eq!(DescribeSpaces.path(), "/fusion/v1/spaces");
        let request = DescribeNode {
            space_id: "spc1".into(),
            node_id: "dst1".into(),
        };
        assert_eq!(request.path(), "/fusion/v1/spaces/spc1/nodes/dst1");
    }
}
