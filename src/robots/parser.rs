//! Robots.txt rule extraction
//!
//! The robotstxt crate tokenizes the file; this module keeps only the groups
//! that apply to our crawler and reduces them to plain path prefix lists.

use robotstxt::{parse_robotstxt, RobotsParseHandler};

/// Allow and disallow path prefixes for one origin
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RobotsRuleSet {
    pub allow: Vec<String>,
    pub disallow: Vec<String>,
}

impl RobotsRuleSet {
    /// A rule set with no restrictions, used when robots.txt is unavailable
    pub fn allow_all() -> Self {
        Self::default()
    }

    /// Parses robots.txt content, merging the `*` group with any group naming `agent`
    pub fn parse(content: &str, agent: &str) -> Self {
        let mut collector = RuleCollector::new(agent);
        parse_robotstxt(content, &mut collector);
        collector.rules
    }

    pub fn is_empty(&self) -> bool {
        self.allow.is_empty() && self.disallow.is_empty()
    }

    /// Decides whether `url` (absolute, under `origin`) may be fetched
    ///
    /// A URL under any disallowed prefix is blocked unless it also falls under
    /// an allowed prefix. URLs matching neither list are permitted.
    pub fn is_allowed(&self, url: &str, origin: &str) -> bool {
        let under = |path: &String| url.starts_with(&join(origin, path));

        if !self.disallow.iter().any(under) {
            return true;
        }
        self.allow.iter().any(under)
    }
}

fn join(origin: &str, path: &str) -> String {
    if path.starts_with('/') {
        format!("{}{}", origin, path)
    } else {
        format!("{}/{}", origin, path)
    }
}

/// Parse callback tracking which user-agent group the current line belongs to
struct RuleCollector {
    agent: String,
    rules: RobotsRuleSet,
    /// The current group names `*` or our agent
    group_applies: bool,
    /// The previous line was a `User-agent:` line, so another one extends the group
    in_agent_lines: bool,
}

impl RuleCollector {
    fn new(agent: &str) -> Self {
        Self {
            agent: agent.to_lowercase(),
            rules: RobotsRuleSet::default(),
            group_applies: false,
            in_agent_lines: false,
        }
    }

    fn names_us(&self, user_agent: &str) -> bool {
        let user_agent = user_agent.trim();
        if user_agent == "*" {
            return true;
        }
        // "SumiSeek/1.0" names the same product as "SumiSeek"
        let product = user_agent.split('/').next().unwrap_or(user_agent);
        product.eq_ignore_ascii_case(&self.agent)
    }

    fn rule(&mut self, value: &str) -> Option<String> {
        self.in_agent_lines = false;
        let value = value.trim();
        // An empty Disallow/Allow restricts nothing
        if !self.group_applies || value.is_empty() {
            return None;
        }
        Some(value.to_string())
    }
}

impl RobotsParseHandler for RuleCollector {
    fn handle_robots_start(&mut self) {}

    fn handle_robots_end(&mut self) {}

    fn handle_user_agent(&mut self, _line_num: u32, user_agent: &str) {
        if !self.in_agent_lines {
            self.group_applies = false;
            self.in_agent_lines = true;
        }
        if self.names_us(user_agent) {
            self.group_applies = true;
        }
    }

    fn handle_allow(&mut self, _line_num: u32, value: &str) {
        if let Some(path) = self.rule(value) {
            self.rules.allow.push(path);
        }
    }

    fn handle_disallow(&mut self, _line_num: u32, value: &str) {
        if let Some(path) = self.rule(value) {
            self.rules.disallow.push(path);
        }
    }

    fn handle_sitemap(&mut self, _line_num: u32, _value: &str) {}

    fn handle_unknown_action(&mut self, _line_num: u32, _action: &str, _value: &str) {
        self.in_agent_lines = false;
    }
}
