//! Case conversion used by every generated artifact.
//!
//! Any non-alphanumeric character separates words (`get/articles/{id}`), on
//! top of the case and acronym boundaries `convert_case` detects.

use convert_case::{Case, Casing};

fn words(input: &str) -> String {
    input
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// `article-category` -> `ArticleCategory`
pub fn pascal_case(input: &str) -> String {
    words(input).to_case(Case::Pascal)
}

/// `article-category` -> `articleCategory`
pub fn camel_case(input: &str) -> String {
    words(input).to_case(Case::Camel)
}

/// `ArticleCategory` -> `article-category`
pub fn param_case(input: &str) -> String {
    words(input).to_case(Case::Kebab)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pascal_case_joins_capitalized_words() {
        assert_eq!(pascal_case("article"), "Article");
        assert_eq!(pascal_case("article-publishedAt"), "ArticlePublishedAt");
        assert_eq!(pascal_case("blog_post"), "BlogPost");
        assert_eq!(pascal_case("HTMLParser"), "HtmlParser");
        assert_eq!(pascal_case(""), "");
    }

    #[test]
    fn camel_case_lowers_first_word() {
        assert_eq!(camel_case("Article"), "article");
        assert_eq!(camel_case("get/articles"), "getArticles");
        assert_eq!(camel_case("get/articles/{id}"), "getArticlesId");
        assert_eq!(camel_case("blog-posts"), "blogPosts");
        assert_eq!(camel_case("findOne"), "findOne");
        assert_eq!(camel_case("--"), "");
    }

    #[test]
    fn param_case_uses_dashes() {
        assert_eq!(param_case("BlogPost"), "blog-post");
        assert_eq!(param_case("article"), "article");
        assert_eq!(param_case("blog_post"), "blog-post");
    }
}
