use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::domain::{Result, SortDirection, TableError};

/// A column as written by the caller: either a bare name or a descriptor with
/// per-column overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnDecl {
    Name(String),
    Descriptor {
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        display: Option<bool>,
        #[serde(default)]
        sort: Option<SortDirection>,
    },
}

impl From<&str> for ColumnDecl {
    fn from(name: &str) -> Self {
        ColumnDecl::Name(name.to_string())
    }
}

/// Normalized column. `sort` is the header annotation; `None` once another
/// column became the active sort column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Column {
    pub name: String,
    pub display: bool,
    pub sort: Option<SortDirection>,
}

impl Column {
    pub fn as_string(&self) -> String {
        format!(
            "\"{}\", display: {}, sort: {}",
            self.name,
            self.display,
            self.sort.map(SortDirection::as_str).unwrap_or("none"),
        )
    }
}

pub fn normalize(decls: &[ColumnDecl], default_sort: SortDirection) -> Result<Vec<Column>> {
    let columns = decls
        .iter()
        .enumerate()
        .map(|(index, decl)| -> Result<Column> {
            let (name, display, sort) = match decl {
                ColumnDecl::Name(name) => (Some(name), None, None),
                ColumnDecl::Descriptor {
                    name,
                    display,
                    sort,
                } => (name.as_ref(), *display, *sort),
            };
            let name = name
                .filter(|n| !n.trim().is_empty())
                .ok_or(TableError::Schema { index })?;
            Ok(Column {
                name: name.clone(),
                display: display.unwrap_or(true),
                sort: Some(sort.unwrap_or(default_sort)),
            })
        })
        .collect::<Result<Vec<Column>>>()?;

    for c in columns.iter() {
        trace!("Column: {}", c.as_string());
    }
    Ok(columns)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_names_get_defaults() {
        let decls: Vec<ColumnDecl> = ["First Name", "Company"].map(ColumnDecl::from).to_vec();
        let columns = normalize(&decls, SortDirection::Desc).unwrap();
        assert_eq!(
            columns,
            vec![
                Column {
                    name: "First Name".into(),
                    display: true,
                    sort: Some(SortDirection::Desc)
                },
                Column {
                    name: "Company".into(),
                    display: true,
                    sort: Some(SortDirection::Desc)
                },
            ]
        );
    }

    #[test]
    fn descriptor_overrides() {
        let decls: Vec<ColumnDecl> = serde_json::from_str(
            r#"["City", { "name": "State", "display": false, "sort": "asc" }]"#,
        )
        .unwrap();
        let columns = normalize(&decls, SortDirection::Desc).unwrap();
        assert!(columns[0].display);
        assert!(!columns[1].display);
        assert_eq!(columns[1].sort, Some(SortDirection::Asc));
    }

    #[test]
    fn missing_name_is_a_schema_error() {
        let decls: Vec<ColumnDecl> =
            serde_json::from_str(r#"["City", { "display": false }]"#).unwrap();
        let err = normalize(&decls, SortDirection::Desc).unwrap_err();
        assert!(matches!(err, TableError::Schema { index: 1 }));

        let blank = vec![ColumnDecl::from("  ")];
        assert!(matches!(
            normalize(&blank, SortDirection::Desc),
            Err(TableError::Schema { index: 0 })
        ));
    }
}
