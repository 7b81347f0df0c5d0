use super::{alert, escape_html, page};

pub fn login(error: Option<&str>, notice: Option<&str>, username: &str) -> String {
    page(
        "Log in",
        None,
        &format!(
            r#"<div class="card" style="max-width:420px;margin:auto">
    <h1>Log in</h1>
    {notice}{error}
    <form method="post" action="/auth/login">
        <p><label>Username<br><input name="username" value="{username}" required autofocus></label></p>
        <p><label>Password<br><input type="password" name="password" required></label></p>
        <p><button type="submit">Log in</button></p>
    </form>
    <p>No account? <a href="/auth/register">Register</a></p>
</div>"#,
            notice = alert("success", notice),
            error = alert("danger", error),
            username = escape_html(username),
        ),
    )
}

pub fn register(error: Option<&str>, username: &str) -> String {
    page(
        "Register",
        None,
        &format!(
            r#"<div class="card" style="max-width:420px;margin:auto">
    <h1>Create an account</h1>
    {error}
    <form method="post" action="/auth/register">
        <p><label>Username<br><input name="username" value="{username}" required autofocus></label><br>
           <small>At least 3 characters: letters, numbers and underscores.</small></p>
        <p><label>Password<br><input type="password" name="password" required></label><br>
           <small>At least 6 characters.</small></p>
        <p><label>Confirm password<br><input type="password" name="confirmPassword" required></label></p>
        <p><button type="submit">Register</button></p>
    </form>
    <p>Already registered? <a href="/auth/login">Log in</a></p>
</div>"#,
            error = alert("danger", error),
            username = escape_html(username),
        ),
    )
}
