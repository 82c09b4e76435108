/// Convert client (viewport) coordinates to container-relative pixel coordinates.
pub fn client_to_container(
    client_x: f64,
    client_y: f64,
    rect_left: f64,
    rect_top: f64,
) -> (f64, f64) {
    (client_x - rect_left, client_y - rect_top)
}

/// Pure function: convert container-relative coordinates to map-surface
/// coordinates. The SVG keeps its aspect ratio, so a single factor
/// (`surface_w / container_w`) covers both axes.
pub fn container_to_surface(
    container_x: f64,
    container_y: f64,
    container_w: f64,
    surface_w: f64,
) -> Option<(f64, f64)> {
    if container_w <= 0.0 || surface_w <= 0.0 {
        return None;
    }
    let factor = surface_w / container_w;
    Some((container_x * factor, container_y * factor))
}

/// Bounding client rect of an element: (left, top, width, height).
pub fn element_rect(id: &str) -> Option<(f64, f64, f64, f64)> {
    let document = web_sys::window()?.document()?;
    let element = document.get_element_by_id(id)?;
    let rect = element.get_bounding_client_rect();
    Some((rect.left(), rect.top(), rect.width(), rect.height()))
}

/// Client coordinates of a pointer to map-surface coordinates for the
/// container with the given id.
pub fn client_to_map(
    client_x: f64,
    client_y: f64,
    container_id: &str,
    surface_w: f64,
) -> Option<(f64, f64)> {
    let (left, top, width, _) = element_rect(container_id)?;
    let (x, y) = client_to_container(client_x, client_y, left, top);
    container_to_surface(x, y, width, surface_w)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_to_container_origin() {
        let (x, y) = client_to_container(100.0, 200.0, 100.0, 200.0);
        assert!((x - 0.0).abs() < 1e-9);
        assert!((y - 0.0).abs() < 1e-9);
    }

    #[test]
    fn test_client_to_container_offset() {
        let (x, y) = client_to_container(450.0, 350.0, 320.0, 50.0);
        assert!((x - 130.0).abs() < 1e-9);
        assert!((y - 300.0).abs() < 1e-9);
    }

    #[test]
    fn test_container_to_surface_same_size() {
        let (x, y) = container_to_surface(400.0, 300.0, 800.0, 800.0).unwrap();
        assert!((x - 400.0).abs() < 1e-9);
        assert!((y - 300.0).abs() < 1e-9);
    }

    #[test]
    fn test_container_to_surface_scaled_down() {
        // SVG drawn for a 1200 px surface, rendered 600 px wide.
        let (x, y) = container_to_surface(150.0, 100.0, 600.0, 1200.0).unwrap();
        assert!((x - 300.0).abs() < 1e-9);
        assert!((y - 200.0).abs() < 1e-9);
    }

    #[test]
    fn test_container_to_surface_invalid_container() {
        assert!(container_to_surface(10.0, 10.0, 0.0, 800.0).is_none());
        assert!(container_to_surface(10.0, 10.0, 800.0, 0.0).is_none());
    }
}
