//! Controller action discovery

use crate::file_provider::FileProvider;
use crate::models::Endpoint;
use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

static ACTION_SIGNATURE: OnceLock<Regex> = OnceLock::new();

fn action_signature() -> &'static Regex {
    ACTION_SIGNATURE.get_or_init(|| {
        Regex::new(r"public\s+(?:async\s+)?(?:[\w<>,\[\]\.?]+)\s+(\w+)\s*\(").expect("valid regex")
    })
}

/// Every public method of every controller file, in file then lexical order.
///
/// The route is conventional: `/<controller without "Controller">/<action>`.
pub fn extract_endpoints(provider: &dyn FileProvider) -> Vec<Endpoint> {
    let mut endpoints = Vec::new();

    for file in provider.files().iter().filter(|f| f.role.is_controller()) {
        let content = provider.content(file.path());
        if content.is_empty() {
            continue;
        }

        let controller = file.primary_class();
        let prefix = controller.replace("Controller", "");
        for caps in action_signature().captures_iter(&content) {
            let action = &caps[1];
            if action == controller {
                continue;
            }
            let mut endpoint = Endpoint::new(controller, action, format!("/{prefix}/{action}"));
            endpoint.file = file.relative_path.clone();
            endpoints.push(endpoint);
        }
    }

    debug!("Extracted {} endpoints", endpoints.len());
    endpoints
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file_provider::MockFileProvider;

    #[test]
    fn test_extracts_public_actions() {
        let controller = r#"
public class OrdersController : Controller
{
    private readonly IOrderService _orders;
    public OrdersController(IOrderService orders) { _orders = orders; }
    public ActionResult Index() { return View(); }
    public async Task<IActionResult> Details(int id) { return View(); }
    private void Helper() { }
}
"#;
        let provider = MockFileProvider::new(vec![
            ("Controllers/OrdersController.cs", controller),
            ("Services/OrderService.cs", "public class OrderService { public void Run() { } }"),
        ]);
        let endpoints = extract_endpoints(&provider);
        let names: Vec<String> = endpoints.iter().map(Endpoint::name).collect();
        // The constructor and private helpers are not actions
        assert_eq!(names, vec!["OrdersController.Index", "OrdersController.Details"]);
        assert_eq!(endpoints[0].route, "/Orders/Index");
        assert_eq!(endpoints[0].file, "Controllers/OrdersController.cs");
    }

    #[test]
    fn test_controller_named_after_file_when_no_class() {
        let provider = MockFileProvider::new(vec![(
            "Controllers/LegacyController.cs",
            "// partial stub\npublic ActionResult Ping() { return null; }",
        )]);
        let endpoints = extract_endpoints(&provider);
        assert_eq!(endpoints.len(), 1);
        assert_eq!(endpoints[0].controller, "LegacyController");
        assert_eq!(endpoints[0].route, "/Legacy/Ping");
    }
}
