fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    if pkg_config::Config::new().atleast_version("1.1").probe("opus").is_ok() {
        return;
    }

    // Fall back to the Homebrew prefix and the default linker path.
    println!("cargo:rustc-link-search=native=/opt/homebrew/lib");
    println!("cargo:rustc-link-lib=opus");
}
