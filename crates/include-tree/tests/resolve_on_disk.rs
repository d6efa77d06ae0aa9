use dtview_include_tree::{IncludeDiagnostic, IncludeResolver, IncludeStatus};
use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn write(path: &Path, contents: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

#[test]
fn resolves_kernel_style_layout() {
    let temp = tempdir().unwrap();
    let root = fs::canonicalize(temp.path()).unwrap();
    let boot = root.join("arch/arm64/boot/dts/acme");
    let include = root.join("include");

    write(
        &boot.join("board.dts"),
        "/dts-v1/;\n#include \"soc.dtsi\"\n#include <dt-bindings/gpio/gpio.h>\n/ { };\n",
    );
    write(&boot.join("soc.dtsi"), "#include <dt-bindings/clock/acme.h>\n");
    write(&include.join("dt-bindings/gpio/gpio.h"), "#define GPIO_ACTIVE_LOW 1\n");
    write(&include.join("dt-bindings/clock/acme.h"), "#define CLK_UART 3\n");

    let resolver = IncludeResolver::new(vec![boot.clone(), include.clone()]);
    let tree = resolver.resolve(&boot.join("board.dts"));

    assert!(tree.is_clean(), "{:?}", tree.diagnostics);
    let names: Vec<_> = tree
        .root
        .children
        .iter()
        .map(|n| n.display_name.as_str())
        .collect();
    assert_eq!(names, vec!["soc.dtsi", "gpio.h"]);

    let clock = include.join("dt-bindings/clock/acme.h");
    let chain: Vec<_> = tree
        .locate(&clock.to_string_lossy())
        .expect("clock header is in the tree")
        .iter()
        .map(|n| n.display_name.as_str())
        .collect();
    assert_eq!(chain, vec!["board.dts", "soc.dtsi", "acme.h"]);
}

#[cfg(unix)]
#[test]
fn symlinked_root_resolves_to_real_files() {
    let temp = tempdir().unwrap();
    let root = fs::canonicalize(temp.path()).unwrap();
    write(&root.join("real/board.dts"), "#include \"common.dtsi\"\n");
    write(&root.join("real/common.dtsi"), "");
    std::os::unix::fs::symlink(root.join("real"), root.join("link")).unwrap();

    let tree = IncludeResolver::new(Vec::new()).resolve(&root.join("link/board.dts"));
    assert_eq!(
        tree.root.file_path,
        root.join("real/board.dts").to_string_lossy()
    );
    assert_eq!(tree.root.children[0].status, IncludeStatus::Resolved);
}

#[test]
fn unresolved_include_is_reported() {
    let temp = tempdir().unwrap();
    let board = temp.path().join("board.dts");
    write(&board, "#include <nowhere.h>\n");

    let tree = IncludeResolver::new(vec![temp.path().to_path_buf()]).resolve(&board);
    assert_eq!(tree.root.children[0].status, IncludeStatus::Unresolved);
    assert!(matches!(
        tree.diagnostics.as_slice(),
        [IncludeDiagnostic::UnresolvableInclude { requested, .. }] if requested == "nowhere.h"
    ));

    let json = serde_json::to_value(&tree).unwrap();
    assert_eq!(json["root"]["children"][0]["status"], "unresolved");
    assert_eq!(json["diagnostics"][0]["kind"], "unresolvable_include");
}
