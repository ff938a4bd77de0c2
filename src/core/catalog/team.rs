//! Built-in `Team` kind: a Backstage group entity plus a Terraform organization.

use super::{validation_error, ArtifactSpec, Catalog};
use crate::core::error::AppError;
use crate::core::extract::FieldBinding;
use crate::core::template::{Node, StructuredTemplate, Template, TextTemplate};

pub const KIND: &str = "Team";
pub const BACKSTAGE_TEMPLATE: &str = "backstage-group";
pub const TERRAFORM_TEMPLATE: &str = "terraform-org";

/// Backstage entity names: letters, digits, `_` and `-`.
pub const TEAM_ID_PATTERN: &str = "^[a-zA-Z0-9_-]+$";

const TERRAFORM_ORG: &str = r#"# Team: {{name}}
resource "tfe_organization" "org_{{id}}" {
  name  = "{{id}}"
  email = "{{email}}"
}

resource "tfe_team" "owners_{{id}}" {
  name         = "owners"
  organization = tfe_organization.org_{{id}}.name
}

output "org_{{id}}_display_name" {
  value = "{{name}}"
}
"#;

pub fn register(catalog: &mut Catalog) -> Result<(), AppError> {
    catalog.register_template(BACKSTAGE_TEMPLATE, Template::Structured(backstage_group()?))?;
    let terraform = TextTemplate::parse(TERRAFORM_ORG)
        .map_err(|err| validation_error(format!("terraform template: {}", err)))?;
    catalog.register_template(TERRAFORM_TEMPLATE, Template::Text(terraform))?;

    let specs = vec![
        with_team_fields(ArtifactSpec::new(
            BACKSTAGE_TEMPLATE,
            BACKSTAGE_TEMPLATE,
            "backstage-team-{{id}}.yaml",
        )?)?,
        with_team_fields(ArtifactSpec::new(
            TERRAFORM_TEMPLATE,
            TERRAFORM_TEMPLATE,
            "infra/org-{{id}}.tf",
        )?)?,
    ];
    catalog.register(KIND, specs)
}

fn with_team_fields(spec: ArtifactSpec) -> Result<ArtifactSpec, AppError> {
    Ok(spec
        .bind(
            "id",
            FieldBinding::required("spec.id")?.with_pattern(TEAM_ID_PATTERN)?,
        )
        .bind("name", FieldBinding::required("spec.name")?)
        .bind(
            "email",
            FieldBinding::required("spec.email")?.with_default_text("{{id}}@example.com")?,
        ))
}

fn backstage_group() -> Result<StructuredTemplate, AppError> {
    let description = Node::text("Team {{name}}")
        .map_err(|err| validation_error(format!("backstage template: {}", err)))?;
    Ok(StructuredTemplate::new(Node::mapping([
        ("apiVersion", Node::literal("backstage.io/v1alpha1")),
        ("kind", Node::literal("Group")),
        (
            "metadata",
            Node::mapping([
                ("name", Node::field("id")),
                ("description", description),
                (
                    "annotations",
                    Node::mapping([("contact.email", Node::field("email"))]),
                ),
            ]),
        ),
        (
            "spec",
            Node::mapping([
                ("type", Node::literal("team")),
                ("displayName", Node::field("name")),
                ("children", Node::sequence([])),
            ]),
        ),
    ])))
}
