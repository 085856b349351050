//! AcroForm field access
//!
//! Fields live in a tree rooted at the catalog's `/AcroForm /Fields` array.
//! Terminal fields carry the value (`/V`); their widget annotations sit in the
//! page `/Annots` arrays, either merged into the field dictionary or as kids
//! without a partial name of their own.

use crate::document::PdfDocument;
use crate::text::{encode_text_string, object_to_text};
use crate::{FieldMap, PdfError, Result};
use lopdf::{dictionary, Dictionary, Object, ObjectId};
use std::collections::HashSet;

/// Maximum depth of the field tree (and of `/Parent` chains)
const MAX_FIELD_DEPTH: usize = 64;

/// Field type of single-line and multi-line text fields
const TEXT_FIELD_TYPE: &str = "Tx";

/// A terminal form field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    /// Fully qualified name (partial names joined with '.')
    pub name: String,
    /// Field type (`Tx`, `Btn`, `Ch`, `Sig`), inherited from ancestors
    pub field_type: Option<String>,
    /// Current value, when it is a string or a name
    pub value: Option<String>,
}

impl FormField {
    /// Whether this is a text field
    pub fn is_text(&self) -> bool {
        self.field_type.as_deref() == Some(TEXT_FIELD_TYPE)
    }
}

/// How the field walker treats malformed nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WalkMode {
    /// Abort on the first malformed node
    Strict,
    /// Skip malformed nodes and keep going
    Lenient,
}

impl WalkMode {
    fn fail(self, err: PdfError) -> Result<()> {
        match self {
            WalkMode::Strict => Err(err),
            WalkMode::Lenient => {
                log::debug!("Skipping field node: {}", err);
                Ok(())
            }
        }
    }
}

/// Values a field inherits from its ancestors
#[derive(Debug, Clone, Default)]
struct Inherited {
    field_type: Option<String>,
    value: Option<String>,
}

/// A widget on a page and the field dictionary that owns its value
#[derive(Debug, Clone)]
struct WidgetTarget {
    field_id: ObjectId,
    partial_name: String,
    qualified_name: String,
    field_type: Option<String>,
}

impl PdfDocument {
    /// Whether the catalog has an `/AcroForm` entry
    pub fn has_acroform(&self) -> bool {
        self.catalog()
            .map(|catalog| catalog.has(b"AcroForm"))
            .unwrap_or(false)
    }

    /// Enumerate every terminal field of the form
    ///
    /// Returns an empty list when the document has no AcroForm. Any malformed
    /// node in the field tree is an error.
    pub fn form_fields(&self) -> Result<Vec<FormField>> {
        self.collect_fields(WalkMode::Strict)
    }

    /// Text field names mapped to their current values
    ///
    /// Missing values are reported as empty strings.
    pub fn text_fields(&self) -> Result<FieldMap> {
        Ok(self
            .form_fields()?
            .into_iter()
            .filter(FormField::is_text)
            .map(|field| (field.name, field.value.unwrap_or_default()))
            .collect())
    }

    /// Every field name mapped to its current value, whatever its type
    ///
    /// Lower-level than [`PdfDocument::text_fields`]: malformed nodes are
    /// skipped instead of failing the whole listing, and non-string values
    /// are reported as empty strings.
    pub fn all_fields(&self) -> Result<FieldMap> {
        Ok(self
            .collect_fields(WalkMode::Lenient)?
            .into_iter()
            .map(|field| (field.name, field.value.unwrap_or_default()))
            .collect())
    }

    /// Set `/NeedAppearances true` on the form dictionary
    ///
    /// Creates an empty AcroForm when the catalog has none.
    pub fn set_need_appearances(&mut self) -> Result<()> {
        let catalog_id = self.catalog_id()?;
        let acroform = self.catalog()?.get(b"AcroForm").ok().cloned();

        match acroform {
            Some(Object::Reference(form_id)) => {
                self.inner
                    .get_object_mut(form_id)?
                    .as_dict_mut()
                    .map_err(|_| PdfError::ParseError("AcroForm is not a dictionary".to_string()))?
                    .set("NeedAppearances", true);
            }
            Some(Object::Dictionary(mut form)) => {
                form.set("NeedAppearances", true);
                self.catalog_mut(catalog_id)?.set("AcroForm", form);
            }
            Some(_) => {
                return Err(PdfError::ParseError(
                    "AcroForm is not a dictionary".to_string(),
                ))
            }
            None => {
                let form_id = self.inner.add_object(dictionary! {
                    "Fields" => Vec::<Object>::new(),
                    "NeedAppearances" => true,
                });
                self.catalog_mut(catalog_id)?.set("AcroForm", form_id);
            }
        }

        Ok(())
    }

    /// Current `/NeedAppearances` flag, if the form declares one
    pub fn need_appearances(&self) -> Option<bool> {
        let catalog = self.catalog().ok()?;
        let form = self.resolve(catalog.get(b"AcroForm").ok()?).ok()?;
        form.as_dict()
            .ok()?
            .get(b"NeedAppearances")
            .ok()?
            .as_bool()
            .ok()
    }

    /// Write values into the form fields whose widgets sit on a page
    ///
    /// A field matches when its fully qualified name or its partial name is a
    /// key of `values` (exact, case-sensitive). Unmatched fields are left
    /// untouched and unmatched keys are ignored. Non-text fields are never
    /// written.
    ///
    /// # Arguments
    /// * `page` - Page number (1-indexed)
    /// * `values` - Field name to value mapping
    ///
    /// # Returns
    /// Number of fields updated on this page
    pub fn update_page_form_field_values(&mut self, page: u32, values: &FieldMap) -> Result<usize> {
        let pages = self.inner.get_pages();
        let page_id = *pages
            .get(&page)
            .ok_or(PdfError::InvalidPage(page, pages.len()))?;

        let mut updated = 0;
        for target in self.page_widget_targets(page_id)? {
            let Some(value) = values
                .get(&target.qualified_name)
                .or_else(|| values.get(&target.partial_name))
            else {
                continue;
            };

            if let Some(field_type) = target
                .field_type
                .as_deref()
                .filter(|field_type| *field_type != TEXT_FIELD_TYPE)
            {
                log::debug!(
                    "Not writing '{}': field type {} is not a text field",
                    target.qualified_name,
                    field_type
                );
                continue;
            }

            self.inner
                .get_object_mut(target.field_id)?
                .as_dict_mut()
                .map_err(|_| {
                    PdfError::FieldError(format!("'{}' is not a dictionary", target.qualified_name))
                })?
                .set("V", encode_text_string(value));
            log::trace!("Page {}: {} = {:?}", page, target.qualified_name, value);
            updated += 1;
        }

        Ok(updated)
    }

    fn catalog_mut(&mut self, catalog_id: ObjectId) -> Result<&mut Dictionary> {
        self.inner
            .get_object_mut(catalog_id)?
            .as_dict_mut()
            .map_err(|_| PdfError::ParseError("Catalog is not a dictionary".to_string()))
    }

    /// Root entries of the field tree, `None` when there is no form
    fn field_roots(&self) -> Result<Option<&Vec<Object>>> {
        let catalog = self.catalog()?;
        let Ok(form) = catalog.get(b"AcroForm") else {
            return Ok(None);
        };
        let form = self
            .resolve(form)?
            .as_dict()
            .map_err(|_| PdfError::ParseError("AcroForm is not a dictionary".to_string()))?;
        let Ok(fields) = form.get(b"Fields") else {
            return Ok(None);
        };
        let fields = self
            .resolve(fields)?
            .as_array()
            .map_err(|_| PdfError::ParseError("AcroForm /Fields is not an array".to_string()))?;
        Ok(Some(fields))
    }

    fn collect_fields(&self, mode: WalkMode) -> Result<Vec<FormField>> {
        let Some(roots) = self.field_roots()? else {
            return Ok(Vec::new());
        };

        let mut visited = HashSet::new();
        let mut fields = Vec::new();
        for root in roots {
            self.walk_field(
                root,
                "",
                &Inherited::default(),
                0,
                mode,
                &mut visited,
                &mut fields,
            )?;
        }
        Ok(fields)
    }

    #[allow(clippy::too_many_arguments)]
    fn walk_field(
        &self,
        node: &Object,
        parent_name: &str,
        inherited: &Inherited,
        depth: usize,
        mode: WalkMode,
        visited: &mut HashSet<ObjectId>,
        out: &mut Vec<FormField>,
    ) -> Result<()> {
        if depth > MAX_FIELD_DEPTH {
            return mode.fail(PdfError::FieldError(format!(
                "field tree deeper than {MAX_FIELD_DEPTH} under '{parent_name}'"
            )));
        }
        if let Object::Reference(id) = node {
            if !visited.insert(*id) {
                return mode.fail(PdfError::FieldError(format!(
                    "field object {} {} appears twice",
                    id.0, id.1
                )));
            }
        }

        let dict = match self.field_dict(node) {
            Ok(dict) => dict,
            Err(err) => return mode.fail(err),
        };
        let partial_name = match self.partial_name(dict) {
            Ok(name) => name,
            Err(err) => return mode.fail(err),
        };

        let name = match (parent_name.is_empty(), partial_name.as_deref()) {
            (_, None) => parent_name.to_string(),
            (true, Some(partial)) => partial.to_string(),
            (false, Some(partial)) => format!("{parent_name}.{partial}"),
        };

        let inherited = Inherited {
            field_type: dict
                .get(b"FT")
                .ok()
                .and_then(|ft| ft.as_name().ok())
                .map(|ft| String::from_utf8_lossy(ft).into_owned())
                .or_else(|| inherited.field_type.clone()),
            value: match dict.get(b"V") {
                Ok(value) => self.resolve(value).ok().and_then(object_to_text),
                Err(_) => inherited.value.clone(),
            },
        };

        let kids: &[Object] = match dict.get(b"Kids") {
            Ok(kids) => match self.resolve(kids).and_then(|kids| {
                kids.as_array()
                    .map_err(|_| PdfError::FieldError(format!("'{name}' /Kids is not an array")))
            }) {
                Ok(kids) => kids.as_slice(),
                Err(err) => return mode.fail(err),
            },
            Err(_) => &[],
        };

        // Kids without a partial name are widgets of this field, not child fields
        let child_fields: Vec<&Object> = kids
            .iter()
            .filter(|kid| {
                self.field_dict(kid)
                    .map(|kid| kid.has(b"T"))
                    .unwrap_or(false)
            })
            .collect();

        if child_fields.is_empty() {
            if !name.is_empty() {
                out.push(FormField {
                    name,
                    field_type: inherited.field_type,
                    value: inherited.value,
                });
            }
            return Ok(());
        }

        for kid in child_fields {
            self.walk_field(kid, &name, &inherited, depth + 1, mode, visited, out)?;
        }
        Ok(())
    }

    fn field_dict<'a>(&'a self, node: &'a Object) -> Result<&'a Dictionary> {
        self.resolve(node)?
            .as_dict()
            .map_err(|_| PdfError::FieldError("field is not a dictionary".to_string()))
    }

    /// The `/T` entry of a field, `None` when absent
    fn partial_name(&self, dict: &Dictionary) -> Result<Option<String>> {
        match dict.get(b"T") {
            Ok(name) => match self.resolve(name)? {
                Object::String(bytes, _) => Ok(Some(crate::decode_text_string(bytes))),
                _ => Err(PdfError::FieldError(
                    "field name is not a string".to_string(),
                )),
            },
            Err(_) => Ok(None),
        }
    }

    /// Widgets on a page, resolved to the field dictionaries that own their values
    fn page_widget_targets(&self, page_id: ObjectId) -> Result<Vec<WidgetTarget>> {
        let page = self
            .inner
            .get_object(page_id)?
            .as_dict()
            .map_err(|_| PdfError::ParseError("Page object is not a dictionary".to_string()))?;
        let Ok(annots) = page.get(b"Annots") else {
            return Ok(Vec::new());
        };
        let annots = self
            .resolve(annots)?
            .as_array()
            .map_err(|_| PdfError::ParseError("Page /Annots is not an array".to_string()))?;

        let mut targets = Vec::new();
        for annot in annots {
            let Object::Reference(annot_id) = annot else {
                log::debug!("Skipping inline annotation on page {:?}", page_id);
                continue;
            };
            let Ok(widget) = self.inner.get_object(*annot_id).and_then(Object::as_dict) else {
                continue;
            };
            let is_widget = widget
                .get(b"Subtype")
                .and_then(Object::as_name)
                .map(|subtype| subtype == b"Widget")
                .unwrap_or(true);
            if !is_widget {
                continue;
            }

            let field_id = if widget.has(b"T") {
                *annot_id
            } else {
                match widget.get(b"Parent").and_then(Object::as_reference) {
                    Ok(parent_id) => parent_id,
                    Err(_) => continue,
                }
            };

            match self.describe_field(field_id) {
                Ok(Some(target)) => targets.push(target),
                Ok(None) => {}
                Err(err) => log::debug!("Skipping widget {:?}: {}", annot_id, err),
            }
        }

        Ok(targets)
    }

    /// Name and type of a field, walking its `/Parent` chain
    fn describe_field(&self, field_id: ObjectId) -> Result<Option<WidgetTarget>> {
        let mut names = Vec::new();
        let mut field_type = None;
        let mut current = Some(field_id);
        let mut depth = 0;

        while let Some(id) = current {
            if depth > MAX_FIELD_DEPTH {
                return Err(PdfError::FieldError(format!(
                    "/Parent chain deeper than {MAX_FIELD_DEPTH}"
                )));
            }
            let dict = self
                .inner
                .get_object(id)?
                .as_dict()
                .map_err(|_| PdfError::FieldError("field is not a dictionary".to_string()))?;
            if let Some(partial) = self.partial_name(dict)? {
                names.push(partial);
            }
            if field_type.is_none() {
                field_type = dict
                    .get(b"FT")
                    .and_then(Object::as_name)
                    .ok()
                    .map(|ft| String::from_utf8_lossy(ft).into_owned());
            }
            current = dict.get(b"Parent").and_then(Object::as_reference).ok();
            depth += 1;
        }

        let Some(partial_name) = names.first().cloned() else {
            return Ok(None);
        };
        names.reverse();

        Ok(Some(WidgetTarget {
            field_id,
            partial_name,
            qualified_name: names.join("."),
            field_type,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::{Document, StringFormat};
    use pretty_assertions::assert_eq;

    /// One page with a text field, a checkbox and a hierarchical text field
    fn form_document() -> PdfDocument {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let page_id = doc.new_object_id();

        let text_id = doc.add_object(dictionary! {
            "Type" => "Annot",
            "Subtype" => "Widget",
            "FT" => "Tx",
            "T" => Object::string_literal("ma_lop"),
            "V" => Object::string_literal("OLD"),
            "P" => page_id,
        });
        let check_id = doc.add_object(dictionary! {
            "Type" => "Annot",
            "Subtype" => "Widget",
            "FT" => "Btn",
            "T" => Object::string_literal("agree"),
            "V" => "Off",
            "P" => page_id,
        });
        let parent_id = doc.new_object_id();
        let child_id = doc.add_object(dictionary! {
            "Type" => "Annot",
            "Subtype" => "Widget",
            "T" => Object::string_literal("name"),
            "Parent" => parent_id,
            "P" => page_id,
        });
        doc.objects.insert(
            parent_id,
            Object::Dictionary(dictionary! {
                "FT" => "Tx",
                "T" => Object::string_literal("student"),
                "Kids" => vec![child_id.into()],
            }),
        );

        doc.objects.insert(
            page_id,
            Object::Dictionary(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
                "Annots" => vec![text_id.into(), check_id.into(), child_id.into()],
            }),
        );
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
            }),
        );
        let form_id = doc.add_object(dictionary! {
            "Fields" => vec![text_id.into(), check_id.into(), parent_id.into()],
        });
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
            "AcroForm" => form_id,
        });
        doc.trailer.set("Root", catalog_id);
        PdfDocument { inner: doc }
    }

    fn values(pairs: &[(&str, &str)]) -> FieldMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_text_fields_skip_checkbox() {
        let doc = form_document();
        let fields = doc.text_fields().unwrap();
        assert_eq!(fields, values(&[("ma_lop", "OLD"), ("student.name", "")]));
    }

    #[test]
    fn test_all_fields_include_checkbox() {
        let doc = form_document();
        let fields = doc.all_fields().unwrap();
        assert_eq!(
            fields,
            values(&[("ma_lop", "OLD"), ("agree", "Off"), ("student.name", "")])
        );
    }

    #[test]
    fn test_form_field_types_are_inherited() {
        let doc = form_document();
        let fields = doc.form_fields().unwrap();
        let child = fields.iter().find(|f| f.name == "student.name").unwrap();
        assert_eq!(child.field_type.as_deref(), Some("Tx"));
        assert!(child.is_text());
    }

    #[test]
    fn test_update_matches_partial_and_qualified_names() {
        let mut doc = form_document();
        let updated = doc
            .update_page_form_field_values(
                1,
                &values(&[("ma_lop", "C01"), ("student.name", "Nguyễn Văn A"), ("agree", "Yes")]),
            )
            .unwrap();
        assert_eq!(updated, 2);

        let fields = doc.all_fields().unwrap();
        assert_eq!(fields["ma_lop"], "C01");
        assert_eq!(fields["student.name"], "Nguyễn Văn A");
        assert_eq!(fields["agree"], "Off");
    }

    #[test]
    fn test_update_ignores_unknown_keys() {
        let mut doc = form_document();
        let updated = doc
            .update_page_form_field_values(1, &values(&[("missing", "x")]))
            .unwrap();
        assert_eq!(updated, 0);
        assert_eq!(doc.text_fields().unwrap()["ma_lop"], "OLD");
    }

    #[test]
    fn test_update_invalid_page() {
        let mut doc = form_document();
        let result = doc.update_page_form_field_values(5, &FieldMap::new());
        assert!(matches!(result, Err(PdfError::InvalidPage(5, 1))));
    }

    #[test]
    fn test_need_appearances_on_existing_form() {
        let mut doc = form_document();
        assert_eq!(doc.need_appearances(), None);
        doc.set_need_appearances().unwrap();
        assert_eq!(doc.need_appearances(), Some(true));
    }

    #[test]
    fn test_need_appearances_creates_form() {
        let mut doc = form_document();
        let catalog_id = doc.catalog_id().unwrap();
        doc.catalog_mut(catalog_id).unwrap().remove(b"AcroForm");
        assert!(!doc.has_acroform());
        assert!(doc.text_fields().unwrap().is_empty());

        doc.set_need_appearances().unwrap();
        assert!(doc.has_acroform());
        assert_eq!(doc.need_appearances(), Some(true));
        assert!(doc.form_fields().unwrap().is_empty());
    }

    #[test]
    fn test_malformed_name_fails_strict_but_not_lenient() {
        let mut doc = form_document();
        let broken = doc.inner.add_object(dictionary! {
            "FT" => "Tx",
            "T" => 42,
        });
        let catalog_id = doc.catalog_id().unwrap();
        let form_id = doc
            .catalog_mut(catalog_id)
            .unwrap()
            .get(b"AcroForm")
            .unwrap()
            .as_reference()
            .unwrap();
        let form = doc.inner.get_object_mut(form_id).unwrap().as_dict_mut().unwrap();
        let mut fields = form.get(b"Fields").unwrap().as_array().unwrap().clone();
        fields.push(broken.into());
        form.set("Fields", fields);

        assert!(matches!(doc.text_fields(), Err(PdfError::FieldError(_))));
        assert_eq!(doc.all_fields().unwrap().len(), 3);
    }

    #[test]
    fn test_values_written_as_text_strings() {
        let mut doc = form_document();
        doc.update_page_form_field_values(1, &values(&[("ma_lop", "Lớp 1")]))
            .unwrap();
        let page_id = doc.inner.get_pages()[&1];
        let page = doc.inner.get_object(page_id).unwrap().as_dict().unwrap();
        let first_annot = page.get(b"Annots").unwrap().as_array().unwrap()[0]
            .as_reference()
            .unwrap();
        let widget = doc.inner.get_object(first_annot).unwrap().as_dict().unwrap();
        assert!(matches!(
            widget.get(b"V").unwrap(),
            Object::String(_, StringFormat::Hexadecimal)
        ));
    }
}
