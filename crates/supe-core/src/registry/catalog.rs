//! Static registries: frameworks, package managers, UI libraries, add-on
//! libraries, themes, CI templates
//!
//! All tables are built once on first use and never mutated afterwards.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

/// Runtime ecosystem a framework or package manager belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Ecosystem {
    Node,
    Deno,
}

impl Ecosystem {
    pub fn as_str(&self) -> &'static str {
        match self {
            Ecosystem::Node => "node",
            Ecosystem::Deno => "deno",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "node" => Some(Ecosystem::Node),
            "deno" => Some(Ecosystem::Deno),
            _ => None,
        }
    }
}

impl fmt::Display for Ecosystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Framework {
    /// Generator invocation, `{name}` is replaced by the project name
    pub starter: &'static str,
    pub ecosystem: Ecosystem,
    pub category: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct PackageManager {
    /// Prefix used to run one-off generators; may be empty
    pub runner: &'static str,
    pub ecosystem: Ecosystem,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UiKind {
    Styling,
    Component,
}

#[derive(Debug, Clone, Serialize)]
pub struct UiLibrary {
    /// Install command, `{pm}` is replaced by the package manager id
    pub install: &'static str,
    pub ecosystems: &'static [Ecosystem],
    #[serde(rename = "type")]
    pub kind: UiKind,
}

impl UiLibrary {
    pub fn supports(&self, ecosystem: Ecosystem) -> bool {
        self.ecosystems.contains(&ecosystem)
    }
}

/// Optional add-on (animation or pointer interaction); listed, never planned
#[derive(Debug, Clone, Serialize)]
pub struct AddonLibrary {
    pub install: &'static str,
    pub ecosystems: &'static [Ecosystem],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub focus: Option<&'static str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Theme {
    pub palette: &'static [&'static str],
    pub vibe: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct CiTemplate {
    pub filename: &'static str,
    pub content: &'static str,
}

const NODE: &[Ecosystem] = &[Ecosystem::Node];
const NODE_AND_DENO: &[Ecosystem] = &[Ecosystem::Node, Ecosystem::Deno];

pub static FRAMEWORKS: LazyLock<BTreeMap<&'static str, Framework>> = LazyLock::new(|| {
    use Ecosystem::*;
    fn fw(starter: &'static str, ecosystem: Ecosystem, category: &'static str) -> Framework {
        Framework {
            starter,
            ecosystem,
            category,
        }
    }
    BTreeMap::from([
        ("react", fw("create-vite {name} --template react-ts", Node, "frontend")),
        ("vue", fw("create-vite {name} --template vue-ts", Node, "frontend")),
        ("svelte", fw("create-vite {name} --template svelte-ts", Node, "frontend")),
        ("solid", fw("create-vite {name} --template solid-ts", Node, "frontend")),
        ("preact", fw("create-vite {name} --template preact-ts", Node, "frontend")),
        ("lit", fw("npm create lit@latest {name}", Node, "frontend")),
        ("angular", fw("@angular/cli@latest new {name} --defaults --skip-git", Node, "frontend")),
        ("next", fw("create-next-app@latest {name} --ts --eslint --app --use-npm", Node, "fullstack")),
        ("nuxt", fw("nuxi@latest init {name}", Node, "fullstack")),
        ("remix", fw("create-remix@latest {name}", Node, "fullstack")),
        ("astro", fw("create-astro@latest {name}", Node, "fullstack")),
        ("qwik", fw("create-qwik@latest {name}", Node, "frontend")),
        ("gatsby", fw("gatsby@latest new {name}", Node, "frontend")),
        ("ember", fw("ember-cli@latest new {name}", Node, "frontend")),
        ("stencil", fw("@stencil/core@latest init {name}", Node, "frontend")),
        ("electron", fw("create-electron-app {name}", Node, "desktop")),
        ("tauri", fw("create-tauri-app {name}", Node, "desktop")),
        ("express", fw("express-generator {name}", Node, "backend")),
        ("fastify", fw("fastify-cli generate {name}", Node, "backend")),
        ("nest", fw("@nestjs/cli new {name}", Node, "backend")),
        ("hono", fw("create-hono@latest {name}", Node, "backend")),
        ("adonis", fw("create-adonis-ts-app@latest {name}", Node, "backend")),
        ("cloudflare_workers", fw("create-cloudflare@latest {name}", Node, "edge")),
        ("cloudflare_vinext", fw("create-vinxi@latest {name}", Node, "edge")),
        ("deno_fresh", fw("jsr:@fresh/create {name}", Deno, "fullstack")),
    ])
});

pub static PACKAGE_MANAGERS: LazyLock<BTreeMap<&'static str, PackageManager>> =
    LazyLock::new(|| {
        use Ecosystem::*;
        BTreeMap::from([
            ("npm", PackageManager { runner: "npx", ecosystem: Node }),
            ("pnpm", PackageManager { runner: "pnpm dlx", ecosystem: Node }),
            ("yarn", PackageManager { runner: "yarn dlx", ecosystem: Node }),
            ("bun", PackageManager { runner: "bunx", ecosystem: Node }),
            ("deno", PackageManager { runner: "deno run -A -r", ecosystem: Deno }),
        ])
    });

pub static UI_LIBRARIES: LazyLock<BTreeMap<&'static str, UiLibrary>> = LazyLock::new(|| {
    use UiKind::*;
    fn ui(install: &'static str, ecosystems: &'static [Ecosystem], kind: UiKind) -> UiLibrary {
        UiLibrary {
            install,
            ecosystems,
            kind,
        }
    }
    BTreeMap::from([
        ("tailwind", ui("{pm} add -D tailwindcss postcss autoprefixer", NODE_AND_DENO, Styling)),
        ("mui", ui("{pm} add @mui/material @emotion/react @emotion/styled", NODE, Component)),
        ("chakra", ui("{pm} add @chakra-ui/react", NODE, Component)),
        ("antd", ui("{pm} add antd", NODE, Component)),
        ("mantine", ui("{pm} add @mantine/core @mantine/hooks", NODE, Component)),
        ("shadcn", ui("npx shadcn@latest init", NODE, Component)),
        ("radix", ui("{pm} add @radix-ui/react-icons @radix-ui/react-dialog", NODE, Component)),
        ("headlessui", ui("{pm} add @headlessui/react", NODE, Component)),
        ("bootstrap", ui("{pm} add bootstrap", NODE, Styling)),
        ("daisyui", ui("{pm} add -D daisyui", NODE, Styling)),
        ("bulma", ui("{pm} add bulma", NODE, Styling)),
        ("fluent", ui("{pm} add @fluentui/react-components", NODE, Component)),
        ("primer", ui("{pm} add @primer/react", NODE, Component)),
        ("primevue", ui("{pm} add primevue", NODE, Component)),
    ])
});

fn addon(install: &'static str, focus: Option<&'static str>) -> AddonLibrary {
    AddonLibrary {
        install,
        ecosystems: NODE,
        focus,
    }
}

pub static ANIMATION_LIBRARIES: LazyLock<BTreeMap<&'static str, AddonLibrary>> =
    LazyLock::new(|| {
        BTreeMap::from([
            ("framer_motion", addon("{pm} add framer-motion", None)),
            ("gsap", addon("{pm} add gsap", None)),
            ("animejs", addon("{pm} add animejs", None)),
            ("motion_one", addon("{pm} add motion", None)),
            ("lottie_web", addon("{pm} add lottie-web", None)),
            ("react_spring", addon("{pm} add @react-spring/web", None)),
            ("auto_animate", addon("{pm} add @formkit/auto-animate", None)),
        ])
    });

pub static MOUSE_INTERACTION_LIBRARIES: LazyLock<BTreeMap<&'static str, AddonLibrary>> =
    LazyLock::new(|| {
        BTreeMap::from([
            (
                "use_gesture",
                addon("{pm} add @use-gesture/react", Some("drag/gesture and clickable interactions")),
            ),
            (
                "interactjs",
                addon("{pm} add interactjs", Some("drag/drop and pointer interactions")),
            ),
            (
                "pointer_tracker",
                addon("{pm} add pointer-tracker", Some("high-performance pointer tracking")),
            ),
            (
                "dnd_kit",
                addon("{pm} add @dnd-kit/core", Some("click/drag sortable interactions")),
            ),
        ])
    });

pub static THEMES: LazyLock<BTreeMap<&'static str, Theme>> = LazyLock::new(|| {
    BTreeMap::from([
        (
            "calm_pro",
            Theme {
                palette: &["#0F172A", "#334155", "#22C55E", "#F8FAFC"],
                vibe: "Low-cognitive-load productivity theme with soft hierarchy",
            },
        ),
        (
            "neon_noir",
            Theme {
                palette: &["#0B1021", "#7C3AED", "#06B6D4", "#F472B6"],
                vibe: "High-contrast cyberpunk with focused call-to-action accents",
            },
        ),
        (
            "sunrise_flow",
            Theme {
                palette: &["#1E293B", "#FB7185", "#F59E0B", "#FEF3C7"],
                vibe: "Warm motivational flow optimized for onboarding confidence",
            },
        ),
    ])
});

const NODE_BASIC_CI: &str = "name: CI
on: [push, pull_request]
jobs:
  test:
    runs-on: ubuntu-latest
    steps:
      - uses: actions/checkout@v4
      - uses: actions/setup-node@v4
        with:
          node-version: '20'
      - run: npm ci
      - run: npm test
";

const NODE_SECURITY_CI: &str = "name: Security
on: [push, pull_request]
jobs:
  audit:
    runs-on: ubuntu-latest
    steps:
      - uses: actions/checkout@v4
      - uses: actions/setup-node@v4
        with:
          node-version: '20'
      - run: npm ci
      - run: npm audit --audit-level=high
";

pub static CI_TEMPLATES: LazyLock<BTreeMap<&'static str, CiTemplate>> = LazyLock::new(|| {
    BTreeMap::from([
        (
            "node_basic",
            CiTemplate {
                filename: ".github/workflows/ci.yml",
                content: NODE_BASIC_CI,
            },
        ),
        (
            "node_security",
            CiTemplate {
                filename: ".github/workflows/security.yml",
                content: NODE_SECURITY_CI,
            },
        ),
    ])
});

pub fn framework(id: &str) -> Option<&'static Framework> {
    FRAMEWORKS.get(id)
}

pub fn package_manager(id: &str) -> Option<&'static PackageManager> {
    PACKAGE_MANAGERS.get(id)
}

pub fn ui_library(id: &str) -> Option<&'static UiLibrary> {
    UI_LIBRARIES.get(id)
}

pub fn theme(id: &str) -> Option<&'static Theme> {
    THEMES.get(id)
}

pub fn ci_template(id: &str) -> Option<&'static CiTemplate> {
    CI_TEMPLATES.get(id)
}

/// Bare dependency-install command per package manager
pub fn install_hints() -> BTreeMap<&'static str, &'static str> {
    BTreeMap::from([
        ("npm", "npm install"),
        ("pnpm", "pnpm install"),
        ("yarn", "yarn"),
        ("bun", "bun install"),
        ("deno", "deno cache"),
    ])
}

/// One catalog entry, flattened with its id for listing
#[derive(Debug, Clone, Serialize)]
pub struct CatalogEntry<T: Serialize> {
    pub id: &'static str,
    #[serde(flatten)]
    pub descriptor: T,
}

/// Everything the registries know, for `supe catalog`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    pub frameworks: Vec<CatalogEntry<Framework>>,
    pub package_managers: Vec<CatalogEntry<PackageManager>>,
    pub ui_libraries: Vec<CatalogEntry<UiLibrary>>,
    pub animation_libraries: Vec<CatalogEntry<AddonLibrary>>,
    pub mouse_interaction_libraries: Vec<CatalogEntry<AddonLibrary>>,
    pub themes: Vec<CatalogEntry<Theme>>,
}

pub fn catalog() -> Catalog {
    fn entries<T: Serialize + Clone>(
        table: &BTreeMap<&'static str, T>,
    ) -> Vec<CatalogEntry<T>> {
        table
            .iter()
            .map(|(id, descriptor)| CatalogEntry {
                id: *id,
                descriptor: descriptor.clone(),
            })
            .collect()
    }

    Catalog {
        frameworks: entries(&FRAMEWORKS),
        package_managers: entries(&PACKAGE_MANAGERS),
        ui_libraries: entries(&UI_LIBRARIES),
        animation_libraries: entries(&ANIMATION_LIBRARIES),
        mouse_interaction_libraries: entries(&MOUSE_INTERACTION_LIBRARIES),
        themes: entries(&THEMES),
    }
}
