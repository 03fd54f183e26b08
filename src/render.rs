// Test result display.
//
// `render` turns a `RunOutcome` into a tree of display elements without
// touching the terminal; `paint` lays that tree out into ANSI-styled
// lines. Keeping the two apart lets the structure be compared in tests.

use crate::outcome::{ResultNode, RunOutcome};
use crossterm::style::Stylize;

pub const ROOT_GLYPH: &str = "⯆";
pub const GROUP_GLYPH: &str = "▼";
pub const PASSED_TEST_GLYPH: &str = "⯈";
pub const FAILED_TEST_GLYPH: &str = "▼";

pub const SUCCESS_BANNER: &str = "You passed all the tests!";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Plain,
    Pass,
    Fail,
    Muted,
}

impl Tone {
    fn of(passed: bool) -> Self {
        if passed {
            Tone::Pass
        } else {
            Tone::Fail
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub text: String,
    pub tone: Tone,
}

impl Span {
    pub fn new(text: impl Into<String>, tone: Tone) -> Self {
        Span {
            text: text.into(),
            tone,
        }
    }

    fn width(&self) -> usize {
        self.text.chars().count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BorderStyle {
    Rounded,
    Ascii,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Panel {
    pub title: Vec<Span>,
    pub border_tone: Tone,
    pub border: BorderStyle,
    /// Blank rows above and below the body.
    pub padding: usize,
    pub body: Vec<Element>,
}

/// A heading with children drawn under tree guides. Collapsed branches
/// show only their heading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branch {
    pub glyph: &'static str,
    pub label: String,
    pub tone: Tone,
    pub expanded: bool,
    pub children: Vec<Element>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element {
    Branch(Branch),
    Text(Span),
    Panel(Panel),
    Blank,
}

impl Panel {
    /// Panel sized to its contents with a rounded border.
    fn fit(title: Vec<Span>, border_tone: Tone, body: Vec<Element>) -> Self {
        Panel {
            title,
            border_tone,
            border: BorderStyle::Rounded,
            padding: 0,
            body,
        }
    }
}

/// Build the full display for one graded run.
pub fn render(outcome: &RunOutcome) -> Panel {
    let mut body: Vec<Element> = outcome.result_tree.iter().filter_map(render_root).collect();

    if !outcome.stderr.is_empty() {
        body.push(Element::Blank);
        body.push(Element::Panel(Panel::fit(
            vec![Span::new("STDERR", Tone::Plain)],
            Tone::Plain,
            vec![Element::Text(Span::new(outcome.stderr.trim_end(), Tone::Plain))],
        )));
    }

    if outcome.succeeded() {
        body.push(Element::Blank);
        body.push(Element::Panel(Panel {
            title: Vec::new(),
            border_tone: Tone::Pass,
            border: BorderStyle::Ascii,
            padding: 0,
            body: vec![Element::Text(Span::new(SUCCESS_BANNER, Tone::Pass))],
        }));
    }

    Panel {
        title: title(outcome),
        border_tone: if outcome.exit_code == 1 { Tone::Fail } else { Tone::Pass },
        border: BorderStyle::Rounded,
        padding: 1,
        body,
    }
}

fn title(outcome: &RunOutcome) -> Vec<Span> {
    let time = if outcome.timed_out {
        Span::new("Timed Out", Tone::Fail)
    } else {
        Span::new(format!("Time: {}ms", outcome.wall_time_ms), Tone::Plain)
    };
    let passed_tone = if outcome.passed_count == 0 { Tone::Plain } else { Tone::Pass };
    let failed_tone = if outcome.failed_count == 0 { Tone::Plain } else { Tone::Fail };
    let gap = || Span::new("   ", Tone::Plain);

    vec![
        time,
        gap(),
        Span::new(format!("Passed: {}", outcome.passed_count), passed_tone),
        gap(),
        Span::new(format!("Failed: {}", outcome.failed_count), failed_tone),
        gap(),
        Span::new(format!("Exit Code: {}", outcome.exit_code), Tone::Plain),
    ]
}

fn render_root(node: &ResultNode) -> Option<Element> {
    match node {
        ResultNode::Describe { label, passed, items } => Some(Element::Branch(Branch {
            glyph: ROOT_GLYPH,
            label: label.clone(),
            tone: Tone::of(*passed),
            expanded: true,
            children: render_children(items),
        })),
        other => render_node(other),
    }
}

fn render_children(items: &[ResultNode]) -> Vec<Element> {
    items.iter().filter_map(render_node).collect()
}

fn render_node(node: &ResultNode) -> Option<Element> {
    let element = match node {
        ResultNode::Describe { label, passed, items } => Element::Branch(Branch {
            glyph: GROUP_GLYPH,
            label: label.clone(),
            tone: Tone::of(*passed),
            expanded: true,
            children: render_children(items),
        }),
        ResultNode::It { label, passed, items } => Element::Branch(Branch {
            glyph: if *passed { PASSED_TEST_GLYPH } else { FAILED_TEST_GLYPH },
            label: label.clone(),
            tone: Tone::of(*passed),
            expanded: !*passed,
            children: render_children(items),
        }),
        ResultNode::CompletedIn { millis } => {
            Element::Text(Span::new(format!("Completed in {millis}ms"), Tone::Muted))
        }
        ResultNode::Passed { text } => Element::Text(Span::new(text.clone(), Tone::Pass)),
        ResultNode::Failed { text } => Element::Text(Span::new(text.clone(), Tone::Fail)),
        ResultNode::Error { text } => Element::Panel(Panel::fit(
            Vec::new(),
            Tone::Fail,
            vec![Element::Text(Span::new(text.clone(), Tone::Plain))],
        )),
        ResultNode::Log { text } => Element::Panel(Panel::fit(
            vec![Span::new("Log", Tone::Plain)],
            Tone::Plain,
            vec![Element::Text(Span::new(text.clone(), Tone::Plain))],
        )),
        ResultNode::Unknown => return None,
    };
    Some(element)
}

type Line = Vec<Span>;

fn line_width(line: &[Span]) -> usize {
    line.iter().map(Span::width).sum()
}

/// Lay `panel` out as terminal lines with ANSI colours.
pub fn paint(panel: &Panel) -> Vec<String> {
    layout_panel(panel).iter().map(|line| styled(line)).collect()
}

/// Same layout without colours.
pub fn paint_plain(panel: &Panel) -> Vec<String> {
    layout_panel(panel)
        .iter()
        .map(|line| line.iter().map(|s| s.text.as_str()).collect())
        .collect()
}

fn styled(line: &[Span]) -> String {
    line.iter()
        .map(|span| match span.tone {
            Tone::Plain => span.text.clone(),
            Tone::Pass => span.text.as_str().green().to_string(),
            Tone::Fail => span.text.as_str().red().to_string(),
            Tone::Muted => span.text.as_str().dark_grey().to_string(),
        })
        .collect()
}

fn layout(element: &Element) -> Vec<Line> {
    match element {
        Element::Blank => vec![Vec::new()],
        Element::Text(span) => span
            .text
            .split('\n')
            .map(|line| vec![Span::new(line, span.tone)])
            .collect(),
        Element::Panel(panel) => layout_panel(panel),
        Element::Branch(branch) => layout_branch(branch),
    }
}

fn layout_branch(branch: &Branch) -> Vec<Line> {
    let mut label = branch.label.split('\n');
    let mut lines = vec![vec![
        Span::new(format!("{} ", branch.glyph), branch.tone),
        Span::new(label.next().unwrap_or_default(), Tone::Plain),
    ]];
    lines.extend(label.map(|rest| vec![Span::new(format!("  {rest}"), Tone::Plain)]));

    if !branch.expanded {
        return lines;
    }

    let count = branch.children.len();
    for (i, child) in branch.children.iter().enumerate() {
        let last = i + 1 == count;
        let (first, rest) = if last { ("└── ", "    ") } else { ("├── ", "│   ") };
        for (j, mut line) in layout(child).into_iter().enumerate() {
            let guide = if j == 0 { first } else { rest };
            line.insert(0, Span::new(guide, branch.tone));
            lines.push(line);
        }
    }
    lines
}

fn layout_panel(panel: &Panel) -> Vec<Line> {
    let (tl, tr, bl, br, h, v) = match panel.border {
        BorderStyle::Rounded => ("╭", "╮", "╰", "╯", "─", "│"),
        BorderStyle::Ascii => ("+", "+", "+", "+", "-", "|"),
    };
    let hpad = panel.padding.max(1);

    let mut content: Vec<Line> = Vec::new();
    for _ in 0..panel.padding {
        content.push(Vec::new());
    }
    for element in &panel.body {
        content.extend(layout(element));
    }
    for _ in 0..panel.padding {
        content.push(Vec::new());
    }

    let title_width = line_width(&panel.title);
    let content_width = content.iter().map(|l| line_width(l)).max().unwrap_or(0);
    let mut inner = content_width + 2 * hpad;
    if title_width > 0 {
        inner = inner.max(title_width + 4);
    }

    let tone = panel.border_tone;
    let mut top = vec![Span::new(tl, tone)];
    if title_width > 0 {
        top.push(Span::new(format!("{h} "), tone));
        top.extend(panel.title.iter().cloned());
        top.push(Span::new(format!(" {}", h.repeat(inner - title_width - 3)), tone));
    } else {
        top.push(Span::new(h.repeat(inner), tone));
    }
    top.push(Span::new(tr, tone));

    let mut lines = vec![top];
    for line in content {
        let fill = inner - hpad - line_width(&line);
        let mut row = vec![Span::new(v, tone), Span::new(" ".repeat(hpad), Tone::Plain)];
        row.extend(line);
        row.push(Span::new(" ".repeat(fill), Tone::Plain));
        row.push(Span::new(v, tone));
        lines.push(row);
    }
    lines.push(vec![
        Span::new(bl, tone),
        Span::new(h.repeat(inner), tone),
        Span::new(br, tone),
    ]);
    lines
}
