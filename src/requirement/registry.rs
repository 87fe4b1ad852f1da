//! Built-in requirement definitions.
//!
//! The engine workspace needs four external pieces before its project files
//! can be generated: a CMake build tool, the Vulkan SDK, the PhysX physics
//! SDK, and the Assimp asset-import library. The latter two live as source
//! checkouts under `third_party/` and are built in place; the first two are
//! downloaded per platform.
//!
//! Definitions are constructed against a resolved platform so URL templates
//! and library names never branch on OS strings downstream.

use crate::platform::{OsFamily, PlatformInfo, UrlTemplate};
use crate::process::ExternalCommand;
use crate::requirement::{
    Acquisition, EnvVarProbe, FileSetProbe, PostDownloadAction, Requirement,
};
use crate::version::SemVer;
use std::path::Path;

/// Pinned build-tool release fetched when no suitable install exists.
pub const BUILD_TOOL_VERSION: &str = "3.27.9";

/// Pinned graphics SDK release.
pub const GRAPHICS_SDK_VERSION: &str = "1.3.268.0";

/// Names of all built-in requirements, in execution order.
pub fn known_names() -> &'static [&'static str] {
    &["build-tool", "graphics-sdk", "physics-sdk", "asset-importer"]
}

/// Construct the built-in requirements for a workspace.
///
/// `root` is the engine workspace root (where `third_party/` checkouts
/// live); `vendor` is the download/extract cache.
pub fn builtin(platform: &PlatformInfo, root: &Path, vendor: &Path) -> Vec<Requirement> {
    vec![
        build_tool(platform, vendor),
        graphics_sdk(platform, vendor),
        physics_sdk(platform, root),
        asset_importer(platform, root),
    ]
}

fn build_tool(platform: &PlatformInfo, vendor: &Path) -> Requirement {
    let exe = platform.os.exe_name("cmake");

    let mut search_patterns = vec![
        // Anything this tool extracted on a previous run
        format!("{}/build-tool/**/bin/{}", vendor.display(), exe),
    ];
    match platform.os {
        OsFamily::Windows => {
            search_patterns.push("C:/Program Files/CMake/bin/cmake.exe".to_string());
        }
        OsFamily::MacOs | OsFamily::Linux => {
            search_patterns.extend(
                [
                    "/usr/bin/cmake",
                    "/usr/local/bin/cmake",
                    "/opt/local/bin/cmake",
                    "/usr/local/opt/cmake/bin/cmake",
                    "/Applications/CMake.app/Contents/bin/cmake",
                ]
                .map(String::from),
            );
        }
    }

    // Release artifacts name their platform differently than we do
    let (os_token, arch_token, ext) = match platform.os {
        OsFamily::Windows => (
            "windows",
            if platform.arch == "aarch64" {
                "arm64"
            } else {
                "x86_64"
            },
            "zip",
        ),
        OsFamily::MacOs => ("macos", "universal", "tar.gz"),
        OsFamily::Linux => ("linux", platform.arch.as_str(), "tar.gz"),
    };
    let url = format!(
        "https://github.com/Kitware/CMake/releases/download/v{{version}}/cmake-{{version}}-{}-{}.{}",
        os_token, arch_token, ext
    );

    Requirement {
        name: "build-tool".into(),
        min_version: Some(SemVer::new(3, 20, 0)),
        path_lookup: Some("cmake".into()),
        search_patterns,
        env_probe: None,
        file_set_probe: None,
        acquisition: Some(Acquisition {
            url: Some(UrlTemplate::new(url)),
            version: BUILD_TOOL_VERSION.into(),
            sha256: None,
            action: PostDownloadAction::Extract,
            profile_line: None,
        }),
    }
}

fn graphics_sdk(platform: &PlatformInfo, vendor: &Path) -> Requirement {
    let sdk_root = vendor.join("graphics-sdk").join(GRAPHICS_SDK_VERSION);

    let (url, action, profile_line, marker_files) = match platform.os {
        OsFamily::Windows => (
            "https://sdk.lunarg.com/sdk/download/{version}/windows/VulkanSDK-{version}-Installer.exe"
                .to_string(),
            PostDownloadAction::RunInstaller {
                args: vec![
                    "--root".into(),
                    sdk_root.display().to_string(),
                    "--accept-licenses".into(),
                    "--default-answer".into(),
                    "--confirm-command".into(),
                    "install".into(),
                ],
            },
            None,
            vec!["Bin/vulkaninfoSDK.exe".to_string()],
        ),
        OsFamily::MacOs => {
            let dmg = vendor
                .join("graphics-sdk")
                .join(format!("vulkansdk-macos-{}.dmg", GRAPHICS_SDK_VERSION));
            let volume = format!("/Volumes/vulkansdk-macos-{}", GRAPHICS_SDK_VERSION);
            let installer = format!(
                "{}/InstallVulkan.app/Contents/MacOS/InstallVulkan",
                volume
            );
            (
                "https://sdk.lunarg.com/sdk/download/{version}/mac/vulkansdk-macos-{version}.dmg"
                    .to_string(),
                PostDownloadAction::RunBuildCommands {
                    commands: vec![
                        ExternalCommand::new("hdiutil")
                            .arg("attach")
                            .arg(dmg.display().to_string()),
                        ExternalCommand::new(installer).args([
                            "--root".to_string(),
                            sdk_root.display().to_string(),
                            "--accept-licenses".to_string(),
                            "--default-answer".to_string(),
                            "--confirm-command".to_string(),
                            "install".to_string(),
                        ]),
                        ExternalCommand::new("hdiutil").arg("detach").arg(volume),
                    ],
                },
                Some(format!("source {}/setup-env.sh", sdk_root.display())),
                vec!["setup-env.sh".to_string()],
            )
        }
        OsFamily::Linux => (
            "https://sdk.lunarg.com/sdk/download/{version}/linux/vulkansdk-linux-x86_64-{version}.tar.xz"
                .to_string(),
            PostDownloadAction::Extract,
            Some(format!("source {}/setup-env.sh", sdk_root.display())),
            vec!["setup-env.sh".to_string()],
        ),
    };

    Requirement {
        name: "graphics-sdk".into(),
        min_version: None,
        path_lookup: None,
        search_patterns: vec![],
        // An already-installed SDK announces itself through its location
        // variable, version embedded in the path
        env_probe: Some(EnvVarProbe {
            var: "VULKAN_SDK".into(),
            version_substring: Some("1.3.".into()),
        }),
        file_set_probe: Some(FileSetProbe {
            dir_pattern: format!("{}/graphics-sdk/*", vendor.display()),
            files: marker_files,
        }),
        acquisition: Some(Acquisition {
            url: Some(UrlTemplate::new(url)),
            version: GRAPHICS_SDK_VERSION.into(),
            sha256: None,
            action,
            profile_line,
        }),
    }
}

fn physics_sdk(platform: &PlatformInfo, root: &Path) -> Requirement {
    let physx = root.join("third_party/physx/physx");

    let libraries: Vec<String> = match platform.os {
        OsFamily::Windows => ["PhysX_64.dll", "PhysXCommon_64.dll", "PhysXFoundation_64.dll"]
            .iter()
            .flat_map(|lib| {
                ["checked", "release"]
                    .iter()
                    .map(move |config| format!("{}/{}", config, lib))
            })
            .collect(),
        OsFamily::MacOs | OsFamily::Linux => [
            "libPhysX_static_64.a",
            "libPhysXCommon_static_64.a",
            "libPhysXFoundation_static_64.a",
        ]
        .iter()
        .flat_map(|lib| {
            ["checked", "release"]
                .iter()
                .map(move |config| format!("{}/{}", config, lib))
        })
        .collect(),
    };

    let generate = match platform.os {
        OsFamily::Windows => ExternalCommand::new(physx.join("generate_projects.bat"))
            .current_dir(&physx),
        OsFamily::MacOs | OsFamily::Linux => ExternalCommand::new("sh")
            .arg(physx.join("generate_projects.sh").display().to_string())
            .current_dir(&physx),
    };

    let build = |config: &str| {
        ExternalCommand::new("cmake")
            .args(["--build", "compiler/public", "--config", config])
            .current_dir(&physx)
    };

    Requirement {
        name: "physics-sdk".into(),
        min_version: None,
        path_lookup: None,
        search_patterns: vec![],
        env_probe: None,
        file_set_probe: Some(FileSetProbe {
            dir_pattern: format!("{}/bin/*", physx.display()),
            files: libraries,
        }),
        acquisition: Some(Acquisition {
            url: None,
            version: "5.3.1".into(),
            sha256: None,
            action: PostDownloadAction::RunBuildCommands {
                commands: vec![generate, build("checked"), build("release")],
            },
            profile_line: None,
        }),
    }
}

fn asset_importer(platform: &PlatformInfo, root: &Path) -> Requirement {
    let assimp = root.join("third_party/assimp");
    let build_dir = assimp.join("build");

    let library = match platform.os {
        OsFamily::Windows => "assimp.dll",
        OsFamily::MacOs => "libassimp.dylib",
        OsFamily::Linux => "libassimp.so",
    };

    Requirement {
        name: "asset-importer".into(),
        min_version: None,
        path_lookup: None,
        search_patterns: vec![],
        env_probe: None,
        file_set_probe: Some(FileSetProbe {
            dir_pattern: build_dir.join("bin").display().to_string(),
            files: vec![library.to_string()],
        }),
        acquisition: Some(Acquisition {
            url: None,
            version: "5.3.1".into(),
            sha256: None,
            action: PostDownloadAction::RunBuildCommands {
                commands: vec![
                    ExternalCommand::new("cmake").args([
                        format!("-S{}", assimp.display()),
                        format!("-B{}", build_dir.display()),
                    ]),
                    ExternalCommand::new("cmake")
                        .args(["--build".to_string(), build_dir.display().to_string()]),
                ],
            },
            profile_line: None,
        }),
    }
}
