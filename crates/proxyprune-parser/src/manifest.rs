use crate::xml::XmlError;
use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::events::Event;
use std::collections::BTreeSet;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Section {
    Policies,
    Resources,
}

fn section_for(tag: &[u8]) -> Option<Section> {
    match tag {
        b"Policies" => Some(Section::Policies),
        b"Resources" => Some(Section::Resources),
        _ => None,
    }
}

fn syntax(err: impl std::fmt::Display) -> XmlError {
    XmlError::Syntax(err.to_string())
}

fn emit(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<(), XmlError> {
    writer.write_event(event).map_err(syntax)
}

/// Drop `<Policies>`/`<Resources>` listing entries whose text matches a
/// removed name, copying every other event through verbatim.
///
/// Formatting of everything kept is byte-exact: events are re-emitted from
/// the reader's raw slices, and the indentation run preceding a dropped entry
/// is swallowed with it. An empty removal set returns the input unchanged.
pub fn prune_manifest(
    text: &str,
    policies: &BTreeSet<String>,
    resources: &BTreeSet<String>,
) -> Result<String, XmlError> {
    if policies.is_empty() && resources.is_empty() {
        return Ok(text.to_string());
    }

    let mut reader = Reader::from_str(text);
    let mut writer = Writer::new(Vec::new());

    let mut section: Option<Section> = None;
    // Nesting depth below the section element; 0 means listing-entry level.
    let mut section_depth = 0usize;
    // Whitespace run held back until we know whether the next entry survives.
    let mut pending_ws: Vec<Event<'_>> = Vec::new();

    loop {
        let event = reader.read_event().map_err(syntax)?;

        let Some(current) = section else {
            if let Event::Start(ref start) = event {
                if let Some(kind) = section_for(start.local_name().as_ref()) {
                    section = Some(kind);
                    section_depth = 0;
                }
            }
            if matches!(event, Event::Eof) {
                break;
            }
            emit(&mut writer, event)?;
            continue;
        };

        match event {
            Event::Eof => return Err(XmlError::Unbalanced),
            Event::Text(t) if section_depth == 0 && t.iter().all(u8::is_ascii_whitespace) => {
                pending_ws.push(Event::Text(t));
            }
            Event::Start(_) if section_depth == 0 => {
                // Buffer the whole entry, then keep or drop it atomically.
                let mut entry = vec![event];
                let mut inner_text = String::new();
                let mut depth = 1usize;
                while depth > 0 {
                    let next = reader.read_event().map_err(syntax)?;
                    match &next {
                        Event::Start(_) => depth += 1,
                        Event::End(_) => depth -= 1,
                        Event::Text(t) => inner_text.push_str(&t.unescape().map_err(syntax)?),
                        Event::CData(c) => inner_text.push_str(&String::from_utf8_lossy(c)),
                        Event::Eof => return Err(XmlError::Unbalanced),
                        _ => {}
                    }
                    entry.push(next);
                }

                let name = inner_text.trim();
                let removed = match current {
                    Section::Policies => policies.contains(name),
                    Section::Resources => resources.contains(name),
                };
                if removed {
                    pending_ws.clear();
                } else {
                    for ws in pending_ws.drain(..) {
                        emit(&mut writer, ws)?;
                    }
                    for e in entry {
                        emit(&mut writer, e)?;
                    }
                }
            }
            Event::End(_) if section_depth == 0 => {
                for ws in pending_ws.drain(..) {
                    emit(&mut writer, ws)?;
                }
                emit(&mut writer, event)?;
                section = None;
            }
            Event::Start(_) => {
                section_depth += 1;
                emit(&mut writer, event)?;
            }
            Event::End(_) => {
                section_depth -= 1;
                emit(&mut writer, event)?;
            }
            _ => {
                for ws in pending_ws.drain(..) {
                    emit(&mut writer, ws)?;
                }
                emit(&mut writer, event)?;
            }
        }
    }

    String::from_utf8(writer.into_inner()).map_err(|_| XmlError::Syntax("non-UTF-8 output".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
<APIProxy revision=\"3\" name=\"orders\">\n\
  <DisplayName>orders</DisplayName>\n\
  <Policies>\n\
    <Policy>Log</Policy>\n\
    <Policy>Quota</Policy>\n\
    <Policy>Unused1</Policy>\n\
  </Policies>\n\
  <Resources>\n\
    <Resource>jsc://log.js</Resource>\n\
    <Resource>jsc://unused.js</Resource>\n\
  </Resources>\n\
</APIProxy>\n";

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn empty_removal_set_is_identity() {
        let out = prune_manifest(MANIFEST, &BTreeSet::new(), &BTreeSet::new()).expect("prune");
        assert_eq!(out, MANIFEST);
    }

    #[test]
    fn drops_named_entries_and_keeps_remaining_bytes() {
        let out = prune_manifest(MANIFEST, &set(&["Unused1"]), &set(&["jsc://unused.js"]))
            .expect("prune");

        assert!(!out.contains("Unused1"));
        assert!(!out.contains("jsc://unused.js"));
        // Every surviving line is byte-identical to the input.
        for line in out.lines() {
            assert!(MANIFEST.contains(line), "unexpected line: {line:?}");
        }
        assert!(out.contains("    <Policy>Log</Policy>\n    <Policy>Quota</Policy>\n"));
        assert!(out.contains("<Resource>jsc://log.js</Resource>"));
    }

    #[test]
    fn preserves_remaining_entry_order() {
        let out = prune_manifest(MANIFEST, &set(&["Quota"]), &BTreeSet::new()).expect("prune");
        let log = out.find("<Policy>Log<").expect("Log entry");
        let unused = out.find("<Policy>Unused1<").expect("Unused1 entry");
        assert!(log < unused);
    }

    #[test]
    fn name_outside_listing_sections_is_untouched() {
        let out = prune_manifest(MANIFEST, &set(&["orders"]), &BTreeSet::new()).expect("prune");
        assert_eq!(out, MANIFEST);
    }

    #[test]
    fn manifest_without_listings_is_unchanged() {
        let doc = "<APIProxy name=\"bare\">\n  <DisplayName>bare</DisplayName>\n</APIProxy>\n";
        let out = prune_manifest(doc, &set(&["anything"]), &BTreeSet::new()).expect("prune");
        assert_eq!(out, doc);
    }

    #[test]
    fn truncated_document_is_an_error() {
        let doc = "<APIProxy><Policies><Policy>Log";
        assert!(prune_manifest(doc, &set(&["Log"]), &BTreeSet::new()).is_err());
    }
}
