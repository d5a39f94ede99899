use reqwest::Url;
use crate::pipeline::ScanMode;

/// Recon focus areas, rotated per attempt. `{hostname}` is substituted.
pub const RECON_FOCUS: &[&str] = &[
    "focus on public exploits and technology fingerprinting to find known vulnerabilities.",
    "prioritize identifying the exact versions of all software (CMS, frameworks, libraries) and searching CVE databases exhaustively.",
    "search for publicly exposed administrative panels, forgotten subdomains, and development endpoints.",
    "investigate the target for past data breaches or security incidents that might hint at recurring weaknesses.",
    "use advanced search operators to find sensitive files indexed by search engines, like `site:{hostname} filetype:log` or `inurl:config`.",
];

/// Active and grey-box focus areas.
pub const ACTIVE_FOCUS: &[&str] = &[
    "perform a simulated ACTIVE scan of all inputs, focusing on high-impact, exploitable vulnerabilities like SQLi and RCE.",
    "relentlessly probe every parameter for injection vulnerabilities. Your primary goal is to prove SQLi with a UNION SELECT, or find a vector for Command Injection or SSTI.",
    "focus on finding information disclosure and misconfigurations. Look for exposed directories, verbose error messages, sensitive data in responses, and insecure API endpoints.",
    "analyze the application's business logic. How could features be abused? Look for IDORs, broken access control, parameter tampering, and race conditions.",
    "assume the application has a weak WAF. Craft clever payloads to find reflected, stored, and DOM-based XSS. Pay special attention to unusual contexts and encoding bypasses.",
];

/// Reviewer personas for code scans.
pub const SAST_PERSONAS: &[&str] = &[
    "expert security researcher specializing in white-box code analysis with a bug bounty hunter's mindset",
    "meticulous code auditor with a focus on subtle logic flaws and insecure data handling patterns",
    "penetration tester attempting to find high-impact, chainable vulnerabilities that could lead to a system compromise",
    "automated SAST tool developer, creating a prompt that finds OWASP Top 10 vulnerabilities with high precision",
    "developer performing a peer review, looking for common mistakes, insecure library usage, and 'low-hanging fruit' vulnerabilities",
];

fn rotation(mode: ScanMode) -> &'static [&'static str] {
    match mode {
        ScanMode::Recon => RECON_FOCUS,
        ScanMode::Active | ScanMode::Greybox => ACTIVE_FOCUS,
        ScanMode::Code => SAST_PERSONAS,
    }
}

/// The focus (URL modes) or persona (code mode) for a given attempt.
pub fn focus_for(mode: ScanMode, iteration: u32, target: &str) -> String {
    let list = rotation(mode);
    let entry = list[iteration as usize % list.len()];
    if mode.is_url_scan() {
        entry.replace("{hostname}", &hostname(target))
    } else {
        entry.to_string()
    }
}

/// Host part of a URL target, or the target itself when it does not parse.
pub fn hostname(target: &str) -> String {
    Url::parse(target)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_else(|| target.to_string())
}
