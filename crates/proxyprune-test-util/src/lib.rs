//! Shared fixtures for proxyprune tests.
//!
//! The canonical sample bundle declares four policies (`Log`, `Quota`,
//! `Unused1`, `Unused2`) of which only `Log` and `Quota` are stepped into,
//! `Unused2` being a script policy owning `jsc://unused.js`. Several test
//! suites assert against exactly this shape.

use camino::{Utf8Path, Utf8PathBuf};
use proxyprune_model::FileTree;
use proxyprune_types::BundlePath;
use std::io::Write;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

pub const SAMPLE_MANIFEST: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
<APIProxy revision=\"3\" name=\"orders\">\n\
  <DisplayName>orders</DisplayName>\n\
  <Policies>\n\
    <Policy>Log</Policy>\n\
    <Policy>Quota</Policy>\n\
    <Policy>Unused1</Policy>\n\
    <Policy>Unused2</Policy>\n\
  </Policies>\n\
  <Resources>\n\
    <Resource>jsc://log.js</Resource>\n\
    <Resource>jsc://unused.js</Resource>\n\
  </Resources>\n\
</APIProxy>\n";

const SAMPLE_PROXY_ENDPOINT: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
<ProxyEndpoint name=\"default\">\n\
  <PreFlow name=\"PreFlow\">\n\
    <Request>\n\
      <Step><Name>Log</Name></Step>\n\
      <Step><Name>Quota</Name><Condition>request.verb = \"POST\"</Condition></Step>\n\
    </Request>\n\
    <Response/>\n\
  </PreFlow>\n\
  <HTTPProxyConnection>\n\
    <BasePath>/orders</BasePath>\n\
  </HTTPProxyConnection>\n\
</ProxyEndpoint>\n";

const SAMPLE_TARGET_ENDPOINT: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
<TargetEndpoint name=\"default\">\n\
  <PostFlow name=\"PostFlow\">\n\
    <Response>\n\
      <Step><Name>Log</Name></Step>\n\
    </Response>\n\
  </PostFlow>\n\
</TargetEndpoint>\n";

/// The canonical fixture tree.
pub fn sample_tree() -> FileTree {
    let mut tree = FileTree::new();
    insert(&mut tree, "apiproxy/orders.xml", SAMPLE_MANIFEST);
    insert(&mut tree, "apiproxy/proxies/default.xml", SAMPLE_PROXY_ENDPOINT);
    insert(&mut tree, "apiproxy/targets/default.xml", SAMPLE_TARGET_ENDPOINT);
    insert(
        &mut tree,
        "apiproxy/policies/Log.xml",
        "<Javascript name=\"Log\" timeLimit=\"200\">\n  <ResourceURL>jsc://log.js</ResourceURL>\n</Javascript>\n",
    );
    insert(
        &mut tree,
        "apiproxy/policies/Quota.xml",
        "<Quota name=\"Quota\">\n  <Allow count=\"100\"/>\n</Quota>\n",
    );
    insert(
        &mut tree,
        "apiproxy/policies/Unused1.xml",
        "<AssignMessage name=\"Unused1\">\n  <IgnoreUnresolvedVariables>true</IgnoreUnresolvedVariables>\n</AssignMessage>\n",
    );
    insert(
        &mut tree,
        "apiproxy/policies/Unused2.xml",
        "<Javascript name=\"Unused2\">\n  <ResourceURL>jsc://unused.js</ResourceURL>\n</Javascript>\n",
    );
    insert(&mut tree, "apiproxy/resources/jsc/log.js", "print('log');\n");
    insert(
        &mut tree,
        "apiproxy/resources/jsc/unused.js",
        "print('never called');\n",
    );
    tree
}

fn insert(tree: &mut FileTree, path: &str, content: &str) {
    tree.insert(BundlePath::new(path), content.as_bytes().to_vec());
}

/// `<ProxyEndpoint name="...">body</ProxyEndpoint>` for hand-rolled flows.
pub fn endpoint_xml(name: &str, body: &str) -> String {
    format!("<ProxyEndpoint name=\"{name}\">{body}</ProxyEndpoint>")
}

/// A minimal script policy descriptor.
pub fn script_policy_xml(name: &str) -> String {
    format!("<Javascript name=\"{name}\" timeLimit=\"200\"/>")
}

/// A tree containing a single proxy endpoint descriptor and nothing else.
pub fn bundle_with_endpoint(endpoint: &str) -> FileTree {
    let mut tree = FileTree::new();
    insert(&mut tree, "apiproxy/proxies/default.xml", endpoint);
    tree
}

/// A tree with one proxy endpoint plus the given `(name, xml)` policies.
pub fn bundle_with_endpoint_and_policies(
    endpoint: &str,
    policies: &[(String, String)],
) -> FileTree {
    let mut tree = bundle_with_endpoint(endpoint);
    for (name, xml) in policies {
        insert(&mut tree, &format!("apiproxy/policies/{name}.xml"), xml);
    }
    tree
}

/// Serialize a tree into a zip archive at `<dir>/<name>.zip`.
pub fn write_zip(tree: &FileTree, dir: &Utf8Path, name: &str) -> Utf8PathBuf {
    let path = dir.join(format!("{name}.zip"));
    let file = std::fs::File::create(&path).expect("create zip");
    let mut writer = ZipWriter::new(file);
    let options = SimpleFileOptions::default();
    for (entry, bytes) in tree.iter() {
        writer
            .start_file(entry.as_str(), options)
            .expect("start zip entry");
        writer.write_all(bytes).expect("write zip entry");
    }
    writer.finish().expect("finish zip");
    path
}

/// The canonical fixture, zipped.
pub fn write_sample_zip(dir: &Utf8Path, name: &str) -> Utf8PathBuf {
    write_zip(&sample_tree(), dir, name)
}
