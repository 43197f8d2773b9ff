use std::io::Cursor;

use xmltree::{Element, EmitterConfig, XMLNode};

use crate::sanitizer::constants::{CP_NS, DC_NS};

/// Describe la información necesaria para localizar un nodo en el XML de propiedades.
#[derive(Clone, Copy)]
pub(crate) struct FieldSpec<'a> {
    pub(crate) local_name: &'a str,
    pub(crate) namespace: Option<&'a str>,
}

/// Obtiene el campo correspondiente en `core.xml` a partir de su etiqueta declarada.
pub(crate) fn core_field_spec(tag: &str) -> Option<FieldSpec<'static>> {
    let (namespace, local_name) = match tag {
        "dc:title" => (DC_NS, "title"),
        "dc:creator" => (DC_NS, "creator"),
        "dc:description" => (DC_NS, "description"),
        "dc:subject" => (DC_NS, "subject"),
        "cp:keywords" => (CP_NS, "keywords"),
        _ => return None,
    };

    Some(FieldSpec {
        local_name,
        namespace: Some(namespace),
    })
}

/// Vacía todas las apariciones del campo; un campo ausente ya está limpio.
pub(crate) fn clear_field(root: &mut Element, spec: FieldSpec<'_>) -> bool {
    let mut cleared = false;
    for node in root.children.iter_mut() {
        if let XMLNode::Element(child) = node
            && element_matches(child, &spec)
        {
            cleared |= clear_element_content(child);
        }
    }
    cleared
}

/// Comprueba si un elemento coincide con la especificación de búsqueda.
pub(crate) fn element_matches(element: &Element, spec: &FieldSpec<'_>) -> bool {
    if element.name != spec.local_name {
        return false;
    }

    match (spec.namespace, element.namespace.as_deref()) {
        (Some(expected), Some(actual)) => expected == actual,
        (Some(_), None) => false,
        (None, _) => true,
    }
}

fn clear_element_content(element: &mut Element) -> bool {
    let had_content = element.children.iter().any(|node| match node {
        XMLNode::Text(text) | XMLNode::CData(text) => !text.is_empty(),
        XMLNode::Element(_) => true,
        _ => false,
    });

    element.children.clear();
    had_content
}

/// Devuelve el texto plano contenido dentro de un elemento.
pub(crate) fn element_text_content(element: &Element) -> String {
    let mut content = String::new();
    for node in &element.children {
        if let XMLNode::Text(text) | XMLNode::CData(text) = node {
            content.push_str(text);
        }
    }
    content.trim().to_string()
}

/// Un campo ausente cuenta como vacío.
pub(crate) fn field_is_empty(root: &Element, spec: FieldSpec<'_>) -> bool {
    root.children.iter().all(|node| match node {
        XMLNode::Element(child) if element_matches(child, &spec) => {
            element_text_content(child).is_empty()
                && !child
                    .children
                    .iter()
                    .any(|n| matches!(n, XMLNode::Element(_)))
        }
        _ => true,
    })
}

pub(crate) fn parse_xml(contents: &[u8]) -> Result<Element, String> {
    Element::parse(Cursor::new(contents)).map_err(|e| e.to_string())
}

pub(crate) fn write_xml(root: &Element) -> Result<Vec<u8>, String> {
    let mut output = Vec::new();
    let mut config = EmitterConfig::new();
    config.perform_indent = false;
    config.write_document_declaration = true;
    root.write_with_config(&mut output, config)
        .map_err(|e| e.to_string())?;
    Ok(output)
}
