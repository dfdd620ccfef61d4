//! Flow inspection
//!
//! Reports, as data, what a flow needs before it runs: its template-bearing
//! fields, the assets it depends on, and any issues such as dependencies the
//! resolver can't supply or case tests the registry doesn't know.

use super::{Flow, Registry};
use crate::assets::{AssetRef, AssetResolver};
use crate::ids::NodeId;
use serde::Serialize;

/// A field holding a template, as yielded by an action, router or wait
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateField {
    /// Uuid of the action, case or node that owns the field
    pub owner: String,
    pub field: &'static str,
    pub value: String,
}

impl TemplateField {
    pub fn new(owner: impl Into<String>, field: &'static str, value: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            field,
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    MissingDependency,
    UnknownTest,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    pub node_uuid: NodeId,
    #[serde(rename = "type")]
    pub kind: IssueKind,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Inspection {
    pub templates: Vec<TemplateField>,
    pub dependencies: Vec<AssetRef>,
    pub issues: Vec<Issue>,
}

impl Inspection {
    pub fn has_issues(&self) -> bool {
        !self.issues.is_empty()
    }
}

impl Flow {
    pub fn inspect(&self, assets: &dyn AssetResolver, registry: &Registry) -> Inspection {
        let mut inspection = Inspection::default();

        for node in &self.nodes {
            let mut dependencies = Vec::new();

            for action in &node.actions {
                inspection.templates.extend(action.templates());
                dependencies.extend(action.dependencies());
            }

            if let Some(router) = &node.router {
                inspection.templates.extend(router.templates(&node.uuid));
                dependencies.extend(router.dependencies(&self.localization));

                for test in router.case_tests() {
                    if !registry.has_case_test(test) {
                        inspection.issues.push(Issue {
                            node_uuid: node.uuid.clone(),
                            kind: IssueKind::UnknownTest,
                            description: format!("unknown case test `{}`", test),
                        });
                    }
                }
            }

            for dependency in dependencies {
                if assets.get(dependency.kind, &dependency.id).is_err() {
                    inspection.issues.push(Issue {
                        node_uuid: node.uuid.clone(),
                        kind: IssueKind::MissingDependency,
                        description: format!("missing {} dependency `{}`", dependency.kind, dependency.id),
                    });
                }
                if !inspection.dependencies.contains(&dependency) {
                    inspection.dependencies.push(dependency);
                }
            }
        }

        inspection
    }
}
