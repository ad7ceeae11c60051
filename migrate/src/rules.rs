//! The ordered rewrite pipeline.
//!
//! One structural rewrite per component runs first, then import removal.
//! An import is only removed once nothing in the file refers to the
//! component any more, so a tag the scanner cannot parse keeps its import.
//! Each rule is a pure `&str -> Cow<str>` transformation and returns
//! `Cow::Borrowed` when it changes nothing.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::scanner::{self, Attribute, Tag};

/// Components whose imports are removed and whose tags are rewritten.
pub const MIGRATED_COMPONENTS: &[&str] = &["Box", "Stack", "Container", "Paper", "Divider", "Typography"];

/// MUI system and styling props with no meaning on a plain element.
const STYLE_PROPS: &[&str] = &[
    "sx", "direction", "spacing", "alignItems", "alignContent", "justifyContent", "flexDirection",
    "flexWrap", "flex", "flexGrow", "flexShrink", "flexItem", "gap", "rowGap", "columnGap", "display",
    "p", "pt", "pb", "pl", "pr", "px", "py", "m", "mt", "mb", "ml", "mr", "mx", "my", "width", "height",
    "minWidth", "maxWidth", "minHeight", "maxHeight", "bgcolor", "color", "border", "borderRadius",
    "boxShadow", "position", "overflow", "textAlign", "fontWeight", "fontSize", "elevation", "square",
    "variant", "component", "gutterBottom", "noWrap", "paragraph", "align", "disableGutters",
    "fixed", "orientation", "divider", "useFlexGap", "textTransform", "lineHeight",
];

pub trait Rewrite: Send + Sync {
    fn name(&self) -> &'static str;
    fn apply<'a>(&self, source: &'a str) -> Cow<'a, str>;
}

/// Rules applied in order to a file's full contents.
pub struct Pipeline {
    rules: Vec<Box<dyn Rewrite>>,
}

impl Pipeline {
    pub fn new(rules: Vec<Box<dyn Rewrite>>) -> Self {
        Self { rules }
    }

    /// Material UI layout and typography components to plain HTML elements.
    pub fn mui_to_html() -> Self {
        let mut rules: Vec<Box<dyn Rewrite>> = [
            ComponentRule::new("Box", resolve_box),
            ComponentRule::new("Stack", resolve_stack),
            ComponentRule::new("Container", resolve_container),
            ComponentRule::new("Paper", resolve_paper),
            ComponentRule::new("Divider", resolve_divider),
            ComponentRule::new("Typography", resolve_typography),
        ]
        .into_iter()
        .map(|rule| Box::new(rule) as Box<dyn Rewrite>)
        .collect();
        rules.push(Box::new(NamedImports));
        rules.push(Box::new(DefaultImports));
        Self::new(rules)
    }

    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    pub fn apply(&self, source: &str) -> String {
        let mut text = source.to_string();
        for rule in &self.rules {
            let rewritten = match rule.apply(&text) {
                Cow::Owned(s) => Some(s),
                Cow::Borrowed(_) => None,
            };
            if let Some(s) = rewritten {
                text = s;
            }
        }
        text
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::mui_to_html()
    }
}

// ---------------------------------------------------------------------------
// Imports
// ---------------------------------------------------------------------------

static NAMED_IMPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?m)^[ \t]*import[ \t]*\{(?P<names>[^}]*)\}[ \t]*from[ \t]*(?P<quote>['"])@mui/material['"][ \t]*;?[ \t]*(?P<newline>\r?\n)?"#,
    )
    .expect("named import pattern is valid")
});

static DEFAULT_IMPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?m)^[ \t]*import[ \t]+(?P<local>\w+)[ \t]+from[ \t]*['"]@mui/material/(?P<module>\w+)['"][ \t]*;?[ \t]*(?:\r?\n)?"#,
    )
    .expect("default import pattern is valid")
});

/// Whether `name` appears as an identifier outside the MUI import statements.
fn referenced(source: &str, name: &str) -> bool {
    let imports: Vec<_> = NAMED_IMPORT
        .find_iter(source)
        .chain(DEFAULT_IMPORT.find_iter(source))
        .map(|m| m.range())
        .collect();
    let bytes = source.as_bytes();
    let is_ident = |b: u8| b.is_ascii_alphanumeric() || b == b'_' || b == b'$';

    source.match_indices(name).any(|(at, _)| {
        let end = at + name.len();
        let bounded = (at == 0 || !is_ident(bytes[at - 1])) && bytes.get(end).map_or(true, |&b| !is_ident(b));
        bounded && !imports.iter().any(|r| r.contains(&at))
    })
}

/// `import { Box, Button } from '@mui/material'` loses `Box`; the statement
/// disappears once nothing is left. Aliased names (`Box as MuiBox`) stay.
pub struct NamedImports;

impl Rewrite for NamedImports {
    fn name(&self) -> &'static str {
        "named-imports"
    }

    fn apply<'a>(&self, source: &'a str) -> Cow<'a, str> {
        NAMED_IMPORT.replace_all(source, |caps: &Captures| {
            let names: Vec<&str> = caps["names"]
                .split(',')
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .collect();
            let kept: Vec<&str> = names
                .iter()
                .copied()
                .filter(|n| !MIGRATED_COMPONENTS.contains(n) || referenced(source, n))
                .collect();

            if kept.len() == names.len() {
                return caps[0].to_string();
            }
            if kept.is_empty() {
                return String::new();
            }
            let quote = &caps["quote"];
            let newline = caps.name("newline").map_or("", |m| m.as_str());
            format!("import {{ {} }} from {quote}@mui/material{quote};{newline}", kept.join(", "))
        })
    }
}

/// `import Box from '@mui/material/Box'` for a migrated component.
pub struct DefaultImports;

impl Rewrite for DefaultImports {
    fn name(&self) -> &'static str {
        "default-imports"
    }

    fn apply<'a>(&self, source: &'a str) -> Cow<'a, str> {
        DEFAULT_IMPORT.replace_all(source, |caps: &Captures| {
            let module = &caps["module"];
            if &caps["local"] == module && MIGRATED_COMPONENTS.contains(&module) && !referenced(source, module) {
                String::new()
            } else {
                caps[0].to_string()
            }
        })
    }
}

// ---------------------------------------------------------------------------
// Components
// ---------------------------------------------------------------------------

/// What an opening tag turns into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub element: String,
    pub class: String,
}

impl Target {
    fn new(element: &str, class: &str) -> Self {
        Self {
            element: element.to_string(),
            class: class.to_string(),
        }
    }
}

type Resolver = fn(&[Attribute<'_>], bool) -> Target;

/// Rewrites every `<Name …>` / `</Name>` pair of one component.
///
/// Closing tags are matched to openings with a stack, so each `</Name>` gets
/// the element its own opening tag became. Unmatched closing tags and tags
/// the scanner cannot parse are left as they are.
pub struct ComponentRule {
    component: &'static str,
    resolve: Resolver,
}

impl ComponentRule {
    pub fn new(component: &'static str, resolve: Resolver) -> Self {
        Self { component, resolve }
    }
}

impl Rewrite for ComponentRule {
    fn name(&self) -> &'static str {
        self.component
    }

    fn apply<'a>(&self, source: &'a str) -> Cow<'a, str> {
        let mut out = String::new();
        let mut copied = 0;
        let mut open: Vec<String> = Vec::new();
        let mut pos = 0;

        while let Some(tag) = scanner::next_tag(source, self.component, pos) {
            pos = tag.end();
            let replacement = match &tag {
                Tag::Open {
                    attributes,
                    self_closing,
                    ..
                } => {
                    let target = (self.resolve)(attributes, *self_closing);
                    let rendered = render_open(&target, attributes, *self_closing);
                    if !self_closing {
                        open.push(target.element);
                    }
                    rendered
                }
                Tag::Close { .. } => match open.pop() {
                    Some(element) => format!("</{element}>"),
                    None => continue,
                },
            };
            out.push_str(&source[copied..tag.start()]);
            out.push_str(&replacement);
            copied = tag.end();
        }

        if copied == 0 {
            return Cow::Borrowed(source);
        }
        out.push_str(&source[copied..]);
        Cow::Owned(out)
    }
}

fn render_open(target: &Target, attributes: &[Attribute<'_>], self_closing: bool) -> String {
    let mut class_attr = format!("className=\"{}\"", target.class);
    let mut rest = String::new();

    for attr in attributes {
        if attr.name == "className" {
            class_attr = merge_class(&target.class, attr);
        } else if !STYLE_PROPS.contains(&attr.name) {
            rest.push(' ');
            rest.push_str(attr.raw);
        }
    }

    let close = if self_closing { " />" } else { ">" };
    format!("<{} {class_attr}{rest}{close}", target.element)
}

fn merge_class(base: &str, attr: &Attribute<'_>) -> String {
    if let Some(existing) = attr.literal() {
        let joined = [base, existing]
            .iter()
            .filter(|s| !s.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(" ");
        return format!("className=\"{joined}\"");
    }
    match attr.expression() {
        Some(expr) if !base.is_empty() => format!("className={{`{base} ${{{}}}`}}", expr.trim()),
        _ => attr.raw.to_string(),
    }
}

fn literal<'a>(attributes: &[Attribute<'a>], name: &str) -> Option<&'a str> {
    attributes.iter().find(|a| a.name == name).and_then(Attribute::literal)
}

fn resolve_box(_attributes: &[Attribute<'_>], _self_closing: bool) -> Target {
    Target::new("div", "")
}

fn resolve_stack(attributes: &[Attribute<'_>], _self_closing: bool) -> Target {
    let mut class = match literal(attributes, "direction") {
        Some("row") => "flex flex-row".to_string(),
        Some("row-reverse") => "flex flex-row-reverse".to_string(),
        Some("column-reverse") => "flex flex-col-reverse".to_string(),
        _ => "flex flex-col".to_string(),
    };
    // MUI spacing units are 8px, Tailwind gap units 4px.
    let spacing = attributes
        .iter()
        .find(|a| a.name == "spacing")
        .and_then(|a| a.expression())
        .and_then(|e| e.trim().parse::<u32>().ok())
        .and_then(|units| units.checked_mul(2));
    if let Some(gap) = spacing {
        class.push_str(&format!(" gap-{gap}"));
    }
    Target {
        element: "div".to_string(),
        class,
    }
}

fn resolve_container(_attributes: &[Attribute<'_>], _self_closing: bool) -> Target {
    Target::new("div", "container mx-auto")
}

fn resolve_paper(_attributes: &[Attribute<'_>], _self_closing: bool) -> Target {
    Target::new("div", "rounded-md border bg-card")
}

fn resolve_divider(_attributes: &[Attribute<'_>], self_closing: bool) -> Target {
    if self_closing {
        Target::new("hr", "border-t")
    } else {
        Target::new("div", "border-t")
    }
}

fn resolve_typography(attributes: &[Attribute<'_>], _self_closing: bool) -> Target {
    match literal(attributes, "variant") {
        Some(v @ ("h1" | "h2" | "h3" | "h4" | "h5" | "h6")) => Target::new(v, ""),
        Some("subtitle1" | "subtitle2") => Target::new("p", "font-medium"),
        Some("body2") => Target::new("p", "text-sm"),
        Some("caption") => Target::new("span", "text-xs"),
        Some("overline") => Target::new("span", "text-xs uppercase"),
        _ => Target::new("p", ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn migrate(source: &str) -> String {
        Pipeline::mui_to_html().apply(source)
    }

    #[test]
    fn box_with_import() {
        let src = "import { Box } from '@mui/material';\n<Box sx={{p:2}}>X</Box>";
        assert_eq!(migrate(src), r#"<div className="">X</div>"#);
    }

    #[test]
    fn untouched_source_is_borrowed() {
        let src = "const a = <div>hi</div>;\n";
        for rule in Pipeline::mui_to_html().rules {
            assert!(matches!(rule.apply(src), Cow::Borrowed(_)), "{} changed input", rule.name());
        }
        assert_eq!(migrate(src), src);
    }

    #[test]
    fn named_import_keeps_other_names() {
        let src = "import { Box, Button, Typography } from \"@mui/material\";\nx";
        assert_eq!(migrate(src), "import { Button } from \"@mui/material\";\nx");
    }

    #[test]
    fn named_import_without_migrated_names_is_byte_identical() {
        let src = "import {Button,IconButton} from '@mui/material'\n";
        assert_eq!(migrate(src), src);
    }

    #[test]
    fn multiline_named_import() {
        let src = "import {\n  Box,\n  Stack,\n} from '@mui/material';\nconst x = 1;\n";
        assert_eq!(migrate(src), "const x = 1;\n");
    }

    #[test]
    fn aliased_import_is_kept() {
        let src = "import { Box as MuiBox } from '@mui/material';\n";
        assert_eq!(migrate(src), src);
    }

    #[test]
    fn default_imports() {
        let src = "import Box from '@mui/material/Box';\nimport Button from '@mui/material/Button';\nimport Stack from \"@mui/material/Stack\"\n";
        assert_eq!(migrate(src), "import Button from '@mui/material/Button';\n");
    }

    #[test]
    fn styles_import_is_kept() {
        let src = "import { styled } from '@mui/material/styles';\n";
        assert_eq!(migrate(src), src);
    }

    #[test]
    fn non_style_attributes_survive() {
        let src = r#"<Box key={id} sx={{ p: 1 }} onClick={() => open(id)} data-testid="card">x</Box>"#;
        assert_eq!(
            migrate(src),
            r#"<div className="" key={id} onClick={() => open(id)} data-testid="card">x</div>"#
        );
    }

    #[test]
    fn existing_class_name_is_merged() {
        assert_eq!(
            migrate(r#"<Stack direction="row" className="items-center">a</Stack>"#),
            r#"<div className="flex flex-row items-center">a</div>"#
        );
        assert_eq!(
            migrate(r#"<Box className={cls}>a</Box>"#),
            r#"<div className={cls}>a</div>"#
        );
        assert_eq!(
            migrate(r#"<Paper className={cls}>a</Paper>"#),
            r#"<div className={`rounded-md border bg-card ${cls}`}>a</div>"#
        );
    }

    #[test]
    fn stack_spacing_becomes_gap() {
        assert_eq!(
            migrate("<Stack spacing={2}>a</Stack>"),
            r#"<div className="flex flex-col gap-4">a</div>"#
        );
    }

    #[test]
    fn box_component_prop_is_dropped() {
        assert_eq!(
            migrate(r#"<Box component="form" onSubmit={save}>a</Box>"#),
            r#"<div className="" onSubmit={save}>a</div>"#
        );
    }

    #[test]
    fn nested_boxes() {
        assert_eq!(
            migrate("<Box><Box sx={{m:1}}>in</Box></Box>"),
            r#"<div className=""><div className="">in</div></div>"#
        );
    }

    #[test]
    fn divider_self_closing_and_with_children() {
        assert_eq!(migrate("<Divider />"), r#"<hr className="border-t" />"#);
        assert_eq!(
            migrate("<Divider sx={{ my: 2 }}>or</Divider>"),
            r#"<div className="border-t">or</div>"#
        );
    }

    #[test]
    fn typography_closes_its_own_element() {
        let src = r#"<Typography variant="h4">Title</Typography><Typography variant="body2">Body</Typography>"#;
        assert_eq!(
            migrate(src),
            r#"<h4 className="">Title</h4><p className="text-sm">Body</p>"#
        );
    }

    #[test]
    fn nested_typography() {
        let src = r#"<Typography variant="h6">A <Typography variant="caption">b</Typography></Typography>"#;
        assert_eq!(
            migrate(src),
            r#"<h6 className="">A <span className="text-xs">b</span></h6>"#
        );
    }

    #[test]
    fn unmatched_closing_tag_is_left_alone() {
        let src = "</Box>";
        assert_eq!(migrate(src), src);
    }

    #[test]
    fn pipeline_is_idempotent() {
        let src = "import { Box, Typography, Button } from '@mui/material';\n\
                   <Box sx={{p:2}}><Typography variant=\"h2\">T</Typography><Button /></Box>\n";
        let once = migrate(src);
        assert_eq!(migrate(&once), once);
    }

    #[test]
    fn rule_order() {
        assert_eq!(
            Pipeline::default().rule_names(),
            [
                "Box",
                "Stack",
                "Container",
                "Paper",
                "Divider",
                "Typography",
                "named-imports",
                "default-imports"
            ]
        );
    }

    #[test]
    fn commented_multiline_stack() {
        let src = "import { Stack } from '@mui/material';\n<Stack\n  spacing={1} // tighter\n>\n  x\n</Stack>\n";
        assert_eq!(migrate(src), "<div className=\"flex flex-col gap-2\">\n  x\n</div>\n");
    }

    #[test]
    fn jsx_with_apostrophe_in_attribute_expression() {
        let src = "import { Box } from '@mui/material';\n<Box title={<b>don't</b>}>x</Box>\n";
        assert_eq!(migrate(src), "<div className=\"\" title={<b>don't</b>}>x</div>\n");
    }

    #[test]
    fn import_kept_while_a_tag_is_left_unrewritten() {
        let src = "import { Box, Stack } from '@mui/material';\n<Stack>a</Stack>\n<Box sx={{ p: 2 }\n";
        assert_eq!(
            migrate(src),
            "import { Box } from '@mui/material';\n<div className=\"flex flex-col\">a</div>\n<Box sx={{ p: 2 }\n"
        );
    }

    #[test]
    fn import_kept_when_used_as_a_value() {
        let src = "import Paper from '@mui/material/Paper';\n<Card as={Paper} />\n";
        assert_eq!(migrate(src), src);
    }

    #[test]
    fn longer_identifiers_do_not_count_as_references() {
        let src = "import { Box } from '@mui/material';\nconst BoxShadow = 1;\n<Box>x</Box>\n";
        assert_eq!(migrate(src), "const BoxShadow = 1;\n<div className=\"\">x</div>\n");
    }

    #[test]
    fn oversized_spacing_drops_the_gap() {
        assert_eq!(
            migrate("<Stack spacing={4294967295}>a</Stack>"),
            r#"<div className="flex flex-col">a</div>"#
        );
        assert_eq!(
            migrate("<Stack spacing={1.5}>a</Stack>"),
            r#"<div className="flex flex-col">a</div>"#
        );
    }
}
