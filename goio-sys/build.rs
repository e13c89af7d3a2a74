use std::env;
use std::path::PathBuf;

/// Check for common GoIO SDK checkout locations
#[allow(dead_code)]
fn find_goio_sdk() -> Option<PathBuf> {
    let candidates = [
        "/opt/goio/sdk",
        "/usr/local/goio/sdk",
        "/opt/vernier/goio/sdk",
    ];

    for path in &candidates {
        let p = PathBuf::from(path);
        if p.join("include").exists() {
            return Some(p);
        }
    }
    None
}

/// Check for GoIO library paths
#[allow(dead_code)]
fn find_goio_lib() -> Option<PathBuf> {
    let candidates = [
        "/opt/goio/lib",
        "/usr/local/lib",
        "/usr/lib/x86_64-linux-gnu",
    ];

    for path in &candidates {
        let p = PathBuf::from(path);
        if p.join("libGoIO.so").exists() || p.join("libGoIO_DLL.dylib").exists() {
            return Some(p);
        }
    }
    None
}

fn main() {
    // Only run bindgen and linking logic if the `goio-sdk` feature is enabled.
    // This allows the crate to compile without the SDK if the feature is not active.
    #[cfg(feature = "goio-sdk")]
    {
        println!("cargo:rerun-if-env-changed=GOIO_SDK_DIR");
        println!("cargo:rerun-if-env-changed=GOIO_LIB_DIR");
        println!("cargo:rerun-if-changed=wrapper.h");

        // Try to get SDK directory from environment, with auto-detection fallback
        let sdk_dir = match env::var("GOIO_SDK_DIR") {
            Ok(dir) => PathBuf::from(dir),
            Err(_) => {
                if let Some(found) = find_goio_sdk() {
                    println!(
                        "cargo:warning=GOIO_SDK_DIR not set, auto-detected: {}",
                        found.display()
                    );
                    found
                } else {
                    panic!("GOIO_SDK_DIR environment variable must be set when `goio-sdk` feature is enabled.");
                }
            }
        };

        let sdk_include_path = sdk_dir.join("include");

        // Allow GOIO_LIB_DIR to override the default lib path
        let sdk_lib_path = match env::var("GOIO_LIB_DIR") {
            Ok(lib_dir) => PathBuf::from(lib_dir),
            Err(_) => {
                if let Some(found) = find_goio_lib() {
                    println!(
                        "cargo:warning=GOIO_LIB_DIR not set, auto-detected: {}",
                        found.display()
                    );
                    found
                } else {
                    // Fall back to SDK default
                    sdk_dir.join("lib")
                }
            }
        };

        if !sdk_include_path.exists() {
            panic!(
                "GoIO SDK include path does not exist: {:?}",
                sdk_include_path
            );
        }

        // The lib path might not exist if libraries are installed globally.
        // Warn rather than panic.
        if !sdk_lib_path.exists() {
            println!(
                "cargo:warning=GoIO SDK lib path does not exist: {}",
                sdk_lib_path.display()
            );
            println!("cargo:warning=Linker will search LIBRARY_PATH and standard paths");
        }

        // Generate bindings
        let bindings = bindgen::Builder::default()
            // The input header we would like to generate bindings for.
            .header("wrapper.h")
            // Tell cargo to invalidate the built crate whenever any of the
            // included header files changed.
            .parse_callbacks(Box::new(bindgen::CargoCallbacks::new()))
            // Add include path for GoIO headers
            .clang_arg(format!("-I{}", sdk_include_path.display()))
            // Allowlist functions starting with `GoIO_`
            .allowlist_function("GoIO_.*")
            // Allowlist GoIO typedefs and the opaque sensor handle.
            .allowlist_type("gtype_.*")
            .allowlist_type("GOIO_SENSOR_HANDLE")
            // DDS record layout and command constants
            .allowlist_type("GSensorDDSRec")
            .allowlist_var("GOIO_MAX_.*")
            .allowlist_var("SKIP_.*")
            .allowlist_var("VERNIER_DEFAULT_VENDOR_ID")
            .allowlist_var(".*_DEFAULT_PRODUCT_ID")
            .allowlist_var("kEquationType_.*")
            .default_enum_style(bindgen::EnumVariation::Rust {
                non_exhaustive: false,
            })
            // Finish the builder and generate the bindings.
            .generate()
            .expect("Unable to generate bindings");

        // Write the bindings to the $OUT_DIR/bindings.rs file.
        let out_path = PathBuf::from(env::var("OUT_DIR").unwrap());
        bindings
            .write_to_file(out_path.join("bindings.rs"))
            .expect("Couldn't write bindings!");

        // Link to the GoIO library
        println!("cargo:rustc-link-search=native={}", sdk_lib_path.display());

        #[cfg(target_os = "windows")]
        {
            println!("cargo:rustc-link-lib=GoIO_DLL");
        }
        #[cfg(target_os = "macos")]
        {
            println!("cargo:rustc-link-lib=GoIO_DLL"); // libGoIO_DLL.dylib
        }
        #[cfg(target_os = "linux")]
        {
            println!("cargo:rustc-link-lib=GoIO"); // libGoIO.so
        }
    }
    #[cfg(not(feature = "goio-sdk"))]
    {
        // If the goio-sdk feature is not enabled, create a dummy bindings file
        // to allow src/lib.rs to compile without actual SDK presence.
        let out_path = PathBuf::from(env::var("OUT_DIR").unwrap());
        std::fs::write(
            out_path.join("bindings.rs"),
            "// Dummy bindings when goio-sdk feature is not enabled\n",
        )
        .expect("Couldn't write dummy bindings!");
    }
}
