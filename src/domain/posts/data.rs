use super::Post;

/// Posts the store is seeded with on start-up.
pub fn seed_posts() -> Vec<Post> {
    vec![
        seed(
            1,
            "Angular Control Flow: A New Take on Templates",
            "Angular 17 introduces a built-in control flow syntax that makes templates easier to read and faster to render. With @if, @for and @switch the template language becomes noticeably simpler.",
            "2024-01-15",
            "Angular",
            &["Angular", "Control Flow", "Templates"],
            true,
        ),
        seed(
            2,
            "SCSS Practices for Modern Web Development",
            "SCSS offers powerful features for writing stylesheets. From variables and mixins to nested rules, these are the practices worth adopting first.",
            "2024-01-10",
            "CSS",
            &["SCSS", "CSS", "Styling"],
            false,
        ),
        seed(
            3,
            "Flexbox Layout Patterns for Responsive Design",
            "Flexbox is a capable layout tool for modern pages. This guide walks through practical patterns for responsive and flexible layouts.",
            "2024-01-05",
            "CSS",
            &["Flexbox", "Responsive", "Layout"],
            true,
        ),
        seed(
            4,
            "TypeScript Tips for Angular Developers",
            "TypeScript makes Angular development safer and more productive. These are advanced techniques aimed specifically at Angular projects.",
            "2023-12-28",
            "TypeScript",
            &["TypeScript", "Angular", "Development"],
            false,
        ),
        seed(
            5,
            "Angular Material: Using UI Components Well",
            "Angular Material ships an extensive component library. This walkthrough shows how to apply Material Design effectively in Angular apps.",
            "2023-12-20",
            "Angular",
            &["Angular Material", "UI", "Components"],
            false,
        ),
    ]
}

fn seed(
    id: u64,
    title: &str,
    content: &str,
    publish_date: &str,
    category: &str,
    tags: &[&str],
    featured: bool,
) -> Post {
    Post {
        id,
        title: title.to_string(),
        content: content.to_string(),
        author: "Mehmet Oezdag".to_string(),
        publish_date: publish_date.to_string(),
        category: category.to_string(),
        tags: tags.iter().map(|tag| tag.to_string()).collect(),
        featured,
        image_url: super::default_image_url(id),
    }
}
