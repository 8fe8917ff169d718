use crate::error::{ParseCause, ParseError};
use crate::xml::{XmlElement, parse_document};
use proxyprune_model::{
    Endpoint, EndpointKind, FaultRule, FileTree, Flow, PolicyDefinition, ProxyBundle, Resource,
    Step,
};
use proxyprune_types::BundlePath;
use std::collections::BTreeSet;

const BUNDLE_ROOT: &str = "apiproxy";
const POLICIES_DIR: &str = "apiproxy/policies";
const PROXIES_DIR: &str = "apiproxy/proxies";
const TARGETS_DIR: &str = "apiproxy/targets";
const RESOURCES_DIR: &str = "apiproxy/resources";

/// Policy types known to embed resource references, and the elements that
/// carry them. Types outside this table are not scanned; the ownership scan
/// is structural, never an execution of the policy.
const RESOURCE_BEARING: &[(&str, &[&str])] = &[
    ("javascript", &["ResourceURL", "IncludeURL"]),
    ("javacallout", &["ResourceURL"]),
    ("python", &["ResourceURL"]),
    ("xsl", &["ResourceURL"]),
];

/// Build the bundle model from an extracted file tree.
///
/// Pure function of the input bytes. Unknown elements and attributes are
/// ignored here and survive untouched in the carried file tree.
pub fn parse_bundle(name: &str, files: &FileTree) -> Result<ProxyBundle, ParseError> {
    let manifest = find_manifest(files)?;
    let policies = parse_policies(files)?;

    let mut endpoints = parse_endpoints(files, EndpointKind::Proxy)?;
    endpoints.extend(parse_endpoints(files, EndpointKind::Target)?);

    let resources = collect_resources(files);

    Ok(ProxyBundle {
        name: name.to_string(),
        files: files.clone(),
        manifest,
        endpoints,
        policies,
        resources,
    })
}

fn descriptor_text<'t>(files: &'t FileTree, path: &BundlePath) -> Result<&'t str, ParseError> {
    let bytes = files
        .get(path)
        .unwrap_or_default();
    std::str::from_utf8(bytes).map_err(|_| ParseError::new(path, ParseCause::NonUtf8))
}

/// First top-level `apiproxy/*.xml` whose root element is `APIProxy`.
/// A bundle without one is accepted; there is simply nothing to prune later.
fn find_manifest(files: &FileTree) -> Result<Option<BundlePath>, ParseError> {
    for path in files.paths_under(BUNDLE_ROOT) {
        if path.extension() != Some("xml") || path.as_str().split('/').count() != 2 {
            continue;
        }
        let doc = parse_descriptor(files, path)?;
        if doc.tag.eq_ignore_ascii_case("APIProxy") {
            return Ok(Some(path.clone()));
        }
    }
    Ok(None)
}

fn parse_descriptor(files: &FileTree, path: &BundlePath) -> Result<XmlElement, ParseError> {
    let text = descriptor_text(files, path)?;
    parse_document(text).map_err(|e| ParseError::new(path, e))
}

fn parse_policies(files: &FileTree) -> Result<Vec<PolicyDefinition>, ParseError> {
    let mut seen: BTreeSet<String> = BTreeSet::new();
    let mut out = Vec::new();

    let paths: Vec<BundlePath> = files
        .paths_under(POLICIES_DIR)
        .filter(|p| p.extension() == Some("xml"))
        .cloned()
        .collect();

    for path in paths {
        let doc = parse_descriptor(files, &path)?;
        let name = doc
            .attr("name")
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .ok_or_else(|| ParseError::new(&path, ParseCause::MissingPolicyName))?
            .to_string();
        if !seen.insert(name.clone()) {
            return Err(ParseError::new(&path, ParseCause::DuplicatePolicyName(name)));
        }

        out.push(PolicyDefinition {
            resources: embedded_resources(&doc),
            type_tag: doc.tag.clone(),
            path,
            name,
        });
    }

    Ok(out)
}

fn embedded_resources(doc: &XmlElement) -> Vec<String> {
    let tag = doc.tag.to_ascii_lowercase();
    let Some((_, elements)) = RESOURCE_BEARING.iter().find(|(t, _)| *t == tag) else {
        return Vec::new();
    };

    let mut out = Vec::new();
    for element in elements.iter().copied() {
        for child in doc.children_named(element) {
            let url = child.text().trim().to_string();
            if !url.is_empty() {
                out.push(url);
            }
        }
    }
    out
}

fn parse_endpoints(files: &FileTree, kind: EndpointKind) -> Result<Vec<Endpoint>, ParseError> {
    let (dir, expected) = match kind {
        EndpointKind::Proxy => (PROXIES_DIR, "ProxyEndpoint"),
        EndpointKind::Target => (TARGETS_DIR, "TargetEndpoint"),
    };

    let paths: Vec<BundlePath> = files
        .paths_under(dir)
        .filter(|p| p.extension() == Some("xml"))
        .cloned()
        .collect();

    let mut out = Vec::new();
    for path in paths {
        let doc = parse_descriptor(files, &path)?;
        if !doc.tag.eq_ignore_ascii_case(expected) {
            return Err(ParseError::new(
                &path,
                ParseCause::UnexpectedRoot {
                    expected,
                    found: doc.tag.clone(),
                },
            ));
        }

        let name = doc
            .attr("name")
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| path.file_stem().to_string());

        let fault_rules = match doc.child("FaultRules") {
            Some(rules) => rules
                .children_named("FaultRule")
                .map(|r| parse_fault_rule(r, &path))
                .collect::<Result<Vec<_>, _>>()?,
            None => Vec::new(),
        };

        out.push(Endpoint {
            kind,
            name,
            pre_flow: doc.child("PreFlow").map(|f| parse_flow(f, &path)).transpose()?,
            conditional_flows: match doc.child("Flows") {
                Some(flows) => flows
                    .children_named("Flow")
                    .map(|f| parse_flow(f, &path))
                    .collect::<Result<Vec<_>, _>>()?,
                None => Vec::new(),
            },
            post_flow: doc.child("PostFlow").map(|f| parse_flow(f, &path)).transpose()?,
            fault_rules,
            default_fault_rule: doc
                .child("DefaultFaultRule")
                .map(|r| parse_fault_rule(r, &path))
                .transpose()?,
            path,
        });
    }

    Ok(out)
}

fn parse_flow(el: &XmlElement, path: &BundlePath) -> Result<Flow, ParseError> {
    Ok(Flow {
        name: el.attr("name").map(str::to_string),
        condition: el.child("Condition").map(XmlElement::text),
        request: parse_steps(el.child("Request"), path)?,
        response: parse_steps(el.child("Response"), path)?,
    })
}

fn parse_fault_rule(el: &XmlElement, path: &BundlePath) -> Result<FaultRule, ParseError> {
    Ok(FaultRule {
        name: el.attr("name").map(str::to_string),
        condition: el.child("Condition").map(XmlElement::text),
        steps: el
            .children_named("Step")
            .map(|s| parse_step(s, path))
            .collect::<Result<Vec<_>, _>>()?,
    })
}

fn parse_steps(section: Option<&XmlElement>, path: &BundlePath) -> Result<Vec<Step>, ParseError> {
    let Some(section) = section else {
        return Ok(Vec::new());
    };
    section
        .children_named("Step")
        .map(|s| parse_step(s, path))
        .collect()
}

fn parse_step(el: &XmlElement, path: &BundlePath) -> Result<Step, ParseError> {
    let policy = el
        .child("Name")
        .map(|n| n.text().trim().to_string())
        .filter(|n| !n.is_empty())
        .ok_or_else(|| ParseError::new(path, ParseCause::MissingStepName))?;

    Ok(Step {
        policy,
        condition: el.child("Condition").map(XmlElement::text),
    })
}

/// Every file under `apiproxy/resources/<type>/...`, keyed by its
/// type-qualified URL form `<type>://<file>`.
fn collect_resources(files: &FileTree) -> Vec<Resource> {
    let mut out = Vec::new();
    for path in files.paths_under(RESOURCES_DIR) {
        let mut parts = path.as_str().splitn(4, '/');
        let (_, _, kind, rest) = (
            parts.next(),
            parts.next(),
            parts.next(),
            parts.next(),
        );
        if let (Some(kind), Some(rest)) = (kind, rest) {
            out.push(Resource {
                url: format!("{kind}://{rest}"),
                path: path.clone(),
            });
        }
    }
    out
}
