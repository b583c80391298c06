//! Internal constants and scripts for diagram rendering.

use std::time::Duration;

/// Overall budget for one compile call, session setup included.
pub(crate) const CALL_TIMEOUT: Duration = Duration::from_secs(30);

/// Budget for the render script itself to settle.
pub(crate) const SCRIPT_TIMEOUT: Duration = Duration::from_secs(20);

/// Mermaid library loaded into the blank page.
const MERMAID_CDN_URL: &str = "https://cdn.jsdelivr.net/npm/mermaid@11/dist/mermaid.min.js";

/// Script that loads and initializes the mermaid library.
///
/// Resolves to `true` once the library is ready; rejects if the script tag
/// fails to load.
pub(crate) fn load_library_script() -> String {
    format!(
        r#"(async () => {{
    if (!window.mermaid) {{
        await new Promise((resolve, reject) => {{
            const s = document.createElement('script');
            s.src = '{MERMAID_CDN_URL}';
            s.onload = resolve;
            s.onerror = () => reject(new Error('failed to load mermaid library'));
            document.head.appendChild(s);
        }});
    }}
    mermaid.initialize({{ startOnLoad: false, theme: 'default', securityLevel: 'loose' }});
    return true;
}})()"#
    )
}

/// Script that renders diagram source to SVG.
///
/// The source is passed as a JSON string literal so diagram content cannot
/// break out of the script. The result is an explicit `{ svg, error }`
/// object settled through the awaited promise; a race against the script
/// budget guarantees the promise settles even if the library never returns.
pub(crate) fn render_script(source_json: &str, budget: Duration) -> String {
    let ms = budget.as_millis();
    format!(
        r#"(async () => {{
    const source = {source_json};
    const timeout = new Promise((resolve) =>
        setTimeout(() => resolve({{ svg: null, error: 'diagram render timed out' }}), {ms}));
    const render = (async () => {{
        try {{
            const result = await mermaid.render('diagram-' + Date.now(), source);
            return {{ svg: result.svg, error: null }};
        }} catch (err) {{
            return {{ svg: null, error: err.message || String(err) }};
        }}
    }})();
    return await Promise.race([render, timeout]);
}})()"#
    )
}

/// Script that renders diagram source and injects the SVG into the page
/// body for screenshotting. Settles to `{ ok, error }`.
pub(crate) fn inject_script(source_json: &str, budget: Duration) -> String {
    let ms = budget.as_millis();
    format!(
        r#"(async () => {{
    const source = {source_json};
    const timeout = new Promise((resolve) =>
        setTimeout(() => resolve({{ ok: false, error: 'diagram render timed out' }}), {ms}));
    const render = (async () => {{
        try {{
            const result = await mermaid.render('diagram-' + Date.now(), source);
            document.body.innerHTML = result.svg;
            return {{ ok: true, error: null }};
        }} catch (err) {{
            return {{ ok: false, error: err.message || String(err) }};
        }}
    }})();
    return await Promise.race([render, timeout]);
}})()"#
    )
}
